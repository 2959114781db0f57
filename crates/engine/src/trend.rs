//! Multi-window trend scoring from candle closes.
//!
//! Each window casts up to three votes (moving-average cross, momentum
//! against the window average, last close against the short average) and
//! labels itself up, down, or sideways by vote dominance. The weights
//! and thresholds are fixed scoring rules, not a predictive model.

use heli_core::Candle;

/// Short simple-moving-average length.
pub const SHORT_MA: usize = 5;
/// Long simple-moving-average length.
pub const LONG_MA: usize = 20;
/// Candles fetched per window.
pub const KLINE_LIMIT: usize = 50;
/// Momentum must exceed this many percent to cast a vote.
pub const MOMENTUM_PCT: f64 = 3.0;
/// One side's votes must reach this multiple of the other to win.
pub const VOTE_DOMINANCE: f64 = 1.5;

/// (display label, exchange kline interval) per evaluated window.
pub const TREND_WINDOWS: [(&str, &str); 4] = [
    ("5m", "5m"),
    ("15m", "15m"),
    ("1h", "60m"),
    ("4h", "4h"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Sideways,
}

/// Trend evaluation of a single time window.
#[derive(Debug, Clone)]
pub struct WindowTrend {
    pub label: String,
    pub last_close: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    /// Percent distance of the last close from the window average.
    pub momentum_pct: f64,
    pub votes_up: usize,
    pub votes_down: usize,
    pub direction: Direction,
}

fn sma(closes: &[f64], n: usize) -> f64 {
    let tail = &closes[closes.len() - n..];
    tail.iter().sum::<f64>() / n as f64
}

fn dominant(up: usize, down: usize) -> Direction {
    if up == 0 && down == 0 {
        Direction::Sideways
    } else if up as f64 >= down as f64 * VOTE_DOMINANCE {
        Direction::Up
    } else if down as f64 >= up as f64 * VOTE_DOMINANCE {
        Direction::Down
    } else {
        Direction::Sideways
    }
}

/// Score one window from its candle series.
///
/// Needs at least [`LONG_MA`] candles, otherwise the window is skipped
/// (None) rather than scored on partial data.
pub fn evaluate_window(label: &str, candles: &[Candle]) -> Option<WindowTrend> {
    if candles.len() < LONG_MA {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let last_close = *closes.last()?;

    let short_ma = sma(&closes, SHORT_MA);
    let long_ma = sma(&closes, LONG_MA);
    let window_avg = closes.iter().sum::<f64>() / closes.len() as f64;
    let momentum_pct = if window_avg > 0.0 {
        (last_close - window_avg) / window_avg * 100.0
    } else {
        0.0
    };

    let mut votes_up = 0;
    let mut votes_down = 0;

    // Vote 1: moving-average cross.
    if short_ma > long_ma {
        votes_up += 1;
    } else if short_ma < long_ma {
        votes_down += 1;
    }
    // Vote 2: momentum, only past the threshold.
    if momentum_pct > MOMENTUM_PCT {
        votes_up += 1;
    } else if momentum_pct < -MOMENTUM_PCT {
        votes_down += 1;
    }
    // Vote 3: last close against the short average.
    if last_close > short_ma {
        votes_up += 1;
    } else if last_close < short_ma {
        votes_down += 1;
    }

    Some(WindowTrend {
        label: label.to_string(),
        last_close,
        short_ma,
        long_ma,
        momentum_pct,
        votes_up,
        votes_down,
        direction: dominant(votes_up, votes_down),
    })
}

/// Per-window results plus an overall call across the windows.
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub windows: Vec<WindowTrend>,
    pub overall: Direction,
}

/// Combine evaluated windows; the same dominance rule applies to the
/// window directions themselves.
pub fn overall_trend(windows: Vec<WindowTrend>) -> TrendReport {
    let up = windows
        .iter()
        .filter(|w| w.direction == Direction::Up)
        .count();
    let down = windows
        .iter()
        .filter(|w| w.direction == Direction::Down)
        .count();
    TrendReport {
        overall: dominant(up, down),
        windows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time_ms: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_rising_closes_vote_up() {
        // Steady climb: short MA above long MA, momentum positive,
        // last close above short MA.
        let closes: Vec<f64> = (0..KLINE_LIMIT).map(|i| 1.0 + i as f64 * 0.01).collect();
        let trend = evaluate_window("5m", &candles_from_closes(&closes)).unwrap();

        assert_eq!(trend.votes_up, 3);
        assert_eq!(trend.votes_down, 0);
        assert_eq!(trend.direction, Direction::Up);
    }

    #[test]
    fn test_falling_closes_vote_down() {
        let closes: Vec<f64> = (0..KLINE_LIMIT).map(|i| 2.0 - i as f64 * 0.01).collect();
        let trend = evaluate_window("5m", &candles_from_closes(&closes)).unwrap();

        assert_eq!(trend.votes_down, 3);
        assert_eq!(trend.direction, Direction::Down);
    }

    #[test]
    fn test_flat_closes_are_sideways() {
        let closes = vec![1.0; KLINE_LIMIT];
        let trend = evaluate_window("5m", &candles_from_closes(&closes)).unwrap();

        // Flat series casts no votes at all.
        assert_eq!(trend.votes_up, 0);
        assert_eq!(trend.votes_down, 0);
        assert_eq!(trend.direction, Direction::Sideways);
    }

    #[test]
    fn test_split_votes_need_dominance() {
        // 1 vs 1 is sideways; 2 vs 1 reaches the 1.5x bar and wins.
        assert_eq!(dominant(1, 1), Direction::Sideways);
        assert_eq!(dominant(2, 1), Direction::Up);
        assert_eq!(dominant(1, 2), Direction::Down);
        assert_eq!(dominant(3, 2), Direction::Up);
        assert_eq!(dominant(0, 0), Direction::Sideways);
        assert_eq!(dominant(1, 0), Direction::Up);
    }

    #[test]
    fn test_short_series_is_skipped() {
        let closes = vec![1.0; LONG_MA - 1];
        assert!(evaluate_window("5m", &candles_from_closes(&closes)).is_none());
    }

    #[test]
    fn test_overall_trend_across_windows() {
        let closes_up: Vec<f64> = (0..KLINE_LIMIT).map(|i| 1.0 + i as f64 * 0.01).collect();
        let closes_down: Vec<f64> = (0..KLINE_LIMIT).map(|i| 2.0 - i as f64 * 0.01).collect();
        let up = evaluate_window("5m", &candles_from_closes(&closes_up)).unwrap();
        let down = evaluate_window("15m", &candles_from_closes(&closes_down)).unwrap();

        let report = overall_trend(vec![up.clone(), up.clone(), down.clone()]);
        assert_eq!(report.overall, Direction::Up);

        // One window each way is not dominance.
        let report = overall_trend(vec![up, down]);
        assert_eq!(report.overall, Direction::Sideways);
    }
}
