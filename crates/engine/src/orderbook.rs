//! Orderbook heuristics: decoy-order spam, support/resistance walls,
//! book pressure, and the flow snapshot delta.
//!
//! These are heuristic scoring rules, not validated models. The vote
//! counts and thresholds are fixed by behavioral compatibility with the
//! alerts built on them; callers present the numbers alongside the
//! classification so readers can judge for themselves.

use heli_core::Orderbook;

/// Configuration for the decoy-order detector.
#[derive(Debug, Clone)]
pub struct DecoyConfig {
    /// Orders below this quantity count as decoys.
    pub qty_threshold: f64,
    /// Decoy count at or above which the alert fires.
    pub alert_count: usize,
    /// Maximum price levels listed in a report.
    pub max_display: usize,
}

impl Default for DecoyConfig {
    fn default() -> Self {
        Self {
            qty_threshold: 10_000.0,
            alert_count: 8,
            max_display: 20,
        }
    }
}

/// Result of a decoy scan over one orderbook.
#[derive(Debug, Clone)]
pub struct DecoyReport {
    /// Number of individual orders under the quantity threshold.
    pub decoy_count: usize,
    /// Per-price summed decoy quantity, ascending by price, truncated
    /// to `max_display` levels.
    pub levels: Vec<(f64, f64)>,
    /// Price levels dropped by the display cap.
    pub hidden_levels: usize,
    alert_count: usize,
}

impl DecoyReport {
    /// Whether the scan crossed the alert threshold.
    pub fn triggers(&self) -> bool {
        self.decoy_count >= self.alert_count
    }

    pub fn is_empty(&self) -> bool {
        self.decoy_count == 0
    }
}

/// Scan both sides of the book for decoy orders.
///
/// Orders under the quantity threshold are grouped by exact price and
/// their quantities summed per level. Exact float equality is fine here:
/// prices arrive from a fixed-precision wire format, so equal levels
/// compare bit-identical.
pub fn detect_decoys(book: &Orderbook, config: &DecoyConfig) -> DecoyReport {
    let mut decoys: Vec<(f64, f64)> = book
        .bids
        .iter()
        .chain(book.asks.iter())
        .filter(|(_, qty)| *qty < config.qty_threshold)
        .copied()
        .collect();
    let decoy_count = decoys.len();

    // Group by price: sort, then merge adjacent equal prices.
    decoys.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut levels: Vec<(f64, f64)> = Vec::new();
    for (price, qty) in decoys {
        match levels.last_mut() {
            Some(last) if last.0 == price => last.1 += qty,
            _ => levels.push((price, qty)),
        }
    }

    let hidden_levels = levels.len().saturating_sub(config.max_display);
    levels.truncate(config.max_display);

    DecoyReport {
        decoy_count,
        levels,
        hidden_levels,
        alert_count: config.alert_count,
    }
}

/// Which side of the book dominates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pressure {
    SellHeavy,
    BuyHeavy,
    Balanced,
}

/// Aggregate bid/ask volume with a pressure classification.
#[derive(Debug, Clone)]
pub struct BookSummary {
    pub total_bids: f64,
    pub total_asks: f64,
    /// asks / bids, None when there are no bids.
    pub ask_bid_ratio: Option<f64>,
    pub pressure: Pressure,
    /// Lowest asks, at most five.
    pub top_asks: Vec<(f64, f64)>,
    /// Highest bids, at most five.
    pub top_bids: Vec<(f64, f64)>,
}

/// Summarize the book: side totals, ask/bid ratio, top five levels.
///
/// Ratio above 1.2 reads as sell pressure, below 0.8 as buy support,
/// in between as balanced. An askless or bidless book classifies by
/// whichever side has volume.
pub fn summarize_book(book: &Orderbook) -> BookSummary {
    let total_bids = book.total_bid_qty();
    let total_asks = book.total_ask_qty();

    let ask_bid_ratio = if total_bids > 0.0 {
        Some(total_asks / total_bids)
    } else {
        None
    };
    let pressure = match ask_bid_ratio {
        Some(r) if r > 1.2 => Pressure::SellHeavy,
        Some(r) if r < 0.8 => Pressure::BuyHeavy,
        Some(_) => Pressure::Balanced,
        None if total_asks > 0.0 => Pressure::SellHeavy,
        None => Pressure::Balanced,
    };

    BookSummary {
        total_bids,
        total_asks,
        ask_bid_ratio,
        pressure,
        top_asks: book.asks.iter().take(5).copied().collect(),
        top_bids: book.bids.iter().take(5).copied().collect(),
    }
}

/// Configuration for the support/resistance wall scan.
#[derive(Debug, Clone)]
pub struct WallConfig {
    /// Minimum level quantity to count as a wall.
    pub min_qty: f64,
    /// Half-width of the price band around mid, as a fraction (0.05 = ±5%).
    pub band_pct: f64,
    /// One side must carry at least this multiple of the other to win.
    pub dominance: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            min_qty: 10_000.0,
            band_pct: 0.05,
            dominance: 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallVerdict {
    SupportBelow,
    ResistanceAbove,
    Balanced,
}

/// Wall volumes inside the band, and which side dominates.
#[derive(Debug, Clone)]
pub struct WallReport {
    pub reference_price: f64,
    pub support_qty: f64,
    pub resistance_qty: f64,
    pub verdict: WallVerdict,
}

/// Classify support vs. resistance around a reference price.
///
/// Only levels with at least `min_qty` inside the symmetric band count.
/// Support is bid walls, resistance is ask walls; the larger side wins
/// when it carries `dominance` times the other, else the book is
/// balanced. Two empty sides are balanced by definition.
pub fn classify_walls(book: &Orderbook, reference_price: f64, config: &WallConfig) -> WallReport {
    let lo = reference_price * (1.0 - config.band_pct);
    let hi = reference_price * (1.0 + config.band_pct);

    let side_sum = |levels: &[(f64, f64)]| {
        levels
            .iter()
            .filter(|(price, qty)| *qty >= config.min_qty && *price >= lo && *price <= hi)
            .map(|(_, qty)| qty)
            .sum::<f64>()
    };
    let support_qty = side_sum(&book.bids);
    let resistance_qty = side_sum(&book.asks);

    let verdict = if support_qty == 0.0 && resistance_qty == 0.0 {
        WallVerdict::Balanced
    } else if support_qty >= resistance_qty * config.dominance {
        WallVerdict::SupportBelow
    } else if resistance_qty >= support_qty * config.dominance {
        WallVerdict::ResistanceAbove
    } else {
        WallVerdict::Balanced
    };

    WallReport {
        reference_price,
        support_qty,
        resistance_qty,
        verdict,
    }
}

/// Point-in-time side totals for the flow comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowSnapshot {
    pub total_bids: f64,
    pub total_asks: f64,
    /// Unix seconds when the snapshot was taken.
    pub taken_at: i64,
}

impl FlowSnapshot {
    pub fn of(book: &Orderbook, taken_at: i64) -> Self {
        Self {
            total_bids: book.total_bid_qty(),
            total_asks: book.total_ask_qty(),
            taken_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowVerdict {
    /// More sell volume added than buy volume.
    SellInflow,
    /// More buy volume added than sell volume.
    BuyInflow,
    Neutral,
}

/// Change between two flow snapshots.
#[derive(Debug, Clone, Copy)]
pub struct FlowDelta {
    pub previous: FlowSnapshot,
    pub current: FlowSnapshot,
    pub bids_diff: f64,
    pub asks_diff: f64,
    pub elapsed_minutes: f64,
    pub verdict: FlowVerdict,
}

/// Compare the current snapshot against the previous one.
///
/// The dominant side must actually have grown: shrinking on both sides
/// is neutral regardless of which shrank more.
pub fn flow_delta(previous: FlowSnapshot, current: FlowSnapshot) -> FlowDelta {
    let bids_diff = current.total_bids - previous.total_bids;
    let asks_diff = current.total_asks - previous.total_asks;

    let verdict = if asks_diff > bids_diff && asks_diff > 0.0 {
        FlowVerdict::SellInflow
    } else if bids_diff > asks_diff && bids_diff > 0.0 {
        FlowVerdict::BuyInflow
    } else {
        FlowVerdict::Neutral
    };

    FlowDelta {
        previous,
        current,
        bids_diff,
        asks_diff,
        elapsed_minutes: (current.taken_at - previous.taken_at) as f64 / 60.0,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book(bids: Vec<(f64, f64)>, asks: Vec<(f64, f64)>) -> Orderbook {
        Orderbook { bids, asks }
    }

    fn small_orders(n: usize) -> Vec<(f64, f64)> {
        (0..n).map(|i| (0.01 + i as f64 * 0.001, 500.0)).collect()
    }

    #[test]
    fn test_decoy_alert_fires_at_threshold() {
        let config = DecoyConfig::default();

        // Exactly 8 orders under the threshold: fires.
        let b = book(small_orders(5), small_orders(3));
        let report = detect_decoys(&b, &config);
        assert_eq!(report.decoy_count, 8);
        assert!(report.triggers());

        // 7 orders: does not fire.
        let b = book(small_orders(4), small_orders(3));
        let report = detect_decoys(&b, &config);
        assert_eq!(report.decoy_count, 7);
        assert!(!report.triggers());
    }

    #[test]
    fn test_decoy_groups_by_price_and_ignores_large_orders() {
        let config = DecoyConfig::default();
        let b = book(
            vec![(0.02, 300.0), (0.02, 200.0), (0.019, 50_000.0)],
            vec![(0.021, 100.0)],
        );
        let report = detect_decoys(&b, &config);

        // The 50k bid is not a decoy.
        assert_eq!(report.decoy_count, 3);
        // Two 0.02 orders merged, levels sorted ascending by price.
        assert_eq!(report.levels, vec![(0.02, 500.0), (0.021, 100.0)]);
        assert_eq!(report.hidden_levels, 0);
    }

    #[test]
    fn test_decoy_display_cap() {
        let config = DecoyConfig {
            max_display: 3,
            ..DecoyConfig::default()
        };
        let b = book(small_orders(10), vec![]);
        let report = detect_decoys(&b, &config);

        assert_eq!(report.decoy_count, 10);
        assert_eq!(report.levels.len(), 3);
        assert_eq!(report.hidden_levels, 7);
    }

    #[test]
    fn test_decoy_empty_book() {
        let report = detect_decoys(&book(vec![], vec![]), &DecoyConfig::default());
        assert!(report.is_empty());
        assert!(!report.triggers());
    }

    #[test]
    fn test_book_pressure_classification() {
        // asks/bids = 1.5 -> sell heavy
        let s = summarize_book(&book(vec![(0.02, 1000.0)], vec![(0.021, 1500.0)]));
        assert_eq!(s.pressure, Pressure::SellHeavy);

        // asks/bids = 0.5 -> buy heavy
        let s = summarize_book(&book(vec![(0.02, 2000.0)], vec![(0.021, 1000.0)]));
        assert_eq!(s.pressure, Pressure::BuyHeavy);

        // asks/bids = 1.0 -> balanced
        let s = summarize_book(&book(vec![(0.02, 1000.0)], vec![(0.021, 1000.0)]));
        assert_eq!(s.pressure, Pressure::Balanced);

        // No bids at all: no ratio, asks present -> sell heavy
        let s = summarize_book(&book(vec![], vec![(0.021, 10.0)]));
        assert_eq!(s.ask_bid_ratio, None);
        assert_eq!(s.pressure, Pressure::SellHeavy);
    }

    #[test]
    fn test_wall_band_and_min_qty_filter() {
        let config = WallConfig::default();
        let b = book(
            vec![
                (0.0196, 60_000.0), // support wall inside band
                (0.0150, 90_000.0), // outside the ±5% band
                (0.0198, 2_000.0),  // under min_qty
            ],
            vec![(0.0204, 20_000.0)],
        );
        let report = classify_walls(&b, 0.02, &config);

        assert_eq!(report.support_qty, 60_000.0);
        assert_eq!(report.resistance_qty, 20_000.0);
        // 60k >= 1.4 * 20k
        assert_eq!(report.verdict, WallVerdict::SupportBelow);
    }

    #[test]
    fn test_wall_dominance_required() {
        let config = WallConfig::default();
        // 25k vs 20k: neither side reaches 1.4x the other.
        let b = book(vec![(0.0196, 25_000.0)], vec![(0.0204, 20_000.0)]);
        let report = classify_walls(&b, 0.02, &config);
        assert_eq!(report.verdict, WallVerdict::Balanced);
    }

    #[test]
    fn test_wall_empty_sides_balanced() {
        let report = classify_walls(&book(vec![], vec![]), 0.02, &WallConfig::default());
        assert_eq!(report.verdict, WallVerdict::Balanced);
    }

    #[test]
    fn test_flow_delta_verdicts() {
        let prev = FlowSnapshot {
            total_bids: 1000.0,
            total_asks: 1000.0,
            taken_at: 0,
        };

        // Asks grew more than bids.
        let cur = FlowSnapshot {
            total_bids: 1100.0,
            total_asks: 1500.0,
            taken_at: 600,
        };
        let delta = flow_delta(prev, cur);
        assert_eq!(delta.verdict, FlowVerdict::SellInflow);
        assert_eq!(delta.elapsed_minutes, 10.0);

        // Bids grew more than asks.
        let cur = FlowSnapshot {
            total_bids: 1500.0,
            total_asks: 900.0,
            taken_at: 600,
        };
        assert_eq!(flow_delta(prev, cur).verdict, FlowVerdict::BuyInflow);

        // Both shrank: neutral even though asks shrank less.
        let cur = FlowSnapshot {
            total_bids: 800.0,
            total_asks: 900.0,
            taken_at: 600,
        };
        assert_eq!(flow_delta(prev, cur).verdict, FlowVerdict::Neutral);
    }
}
