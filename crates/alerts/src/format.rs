//! Reply message formatting.
//!
//! Handlers fetch and compute; everything user-visible is assembled here
//! so the texts can be unit tested without a network or a bot.

use heli_core::{format_amount, Amount};
use heli_engine::{
    ApyEstimate, BookSummary, DayBuckets, DecoyReport, Direction, FlowDelta, FlowVerdict,
    NetworkUnbonding, Pressure, TrendReport, ValidatorCounts, WallReport, WallVerdict,
    WalletSummary,
};
use heli_feeds::types::{BlockStatus, DelegationResponse, UnbondingDelegation, Validator};

pub const UNAVAILABLE: &str = "unavailable";

pub fn price(symbol: &str, price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{} price: {:.6} USDT", symbol, p),
        None => format!("{} price: {}", symbol, UNAVAILABLE),
    }
}

pub fn supply(total: Amount) -> String {
    format!("Total supply: {}", total)
}

pub fn staked(bonded: Amount, not_bonded: Amount) -> String {
    format!(
        "Staked (bonded): {}\nNot bonded: {}",
        bonded, not_bonded
    )
}

pub fn bonded_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(pct) => format!("Bonded ratio: {:.4}%", pct),
        None => format!("Bonded ratio: {} (zero total supply)", UNAVAILABLE),
    }
}

pub fn apy(estimate: Option<&ApyEstimate>) -> String {
    match estimate {
        Some(e) => format!(
            "Estimated staking APY: {:.2}%\n\
             Inflation: {:.2}%\n\
             Bonded ratio: {:.2}%\n\
             Commission ({}): {:.2}%\n\
             Note: commission proxied by the largest validator, not a network average.",
            e.apy_pct,
            e.inflation * 100.0,
            e.bonded_ratio * 100.0,
            e.validator_moniker,
            e.commission * 100.0,
        ),
        None => format!("Staking APY: {} (missing pool, supply or validator data)", UNAVAILABLE),
    }
}

pub fn unstake(scan: &NetworkUnbonding) -> String {
    let mut msg = format!("Network unbonding total: {}\n\nTop 10 unbonding wallets:\n", scan.total);
    for (rank, (wallet, amount)) in scan.wallets.top_n(10).iter().enumerate() {
        msg.push_str(&format!("{:>2}. {} - {}\n", rank + 1, wallet, amount));
    }
    if scan.wallets.is_empty() {
        msg.push_str("(none)\n");
    }
    push_failed_note(&mut msg, scan.failed_validators);
    msg
}

pub fn unbonding_wallets(scan: &NetworkUnbonding) -> String {
    let mut msg = format!("Wallets currently unbonding: {}", scan.wallet_count());
    push_failed_note(&mut msg, scan.failed_validators);
    msg
}

pub fn heatmap(scan: &NetworkUnbonding) -> String {
    let mut msg = String::from("Unbonding release heatmap (next 14 days):\n");
    msg.push_str(&day_lines(&scan.heatmap));
    push_failed_note(&mut msg, scan.failed_validators);
    msg
}

fn day_lines(buckets: &DayBuckets) -> String {
    let non_empty = buckets.non_empty();
    if non_empty.is_empty() {
        return "(nothing unbonding in the window)\n".to_string();
    }
    let mut out = String::new();
    for (day, amount) in non_empty {
        let label = match day {
            0 => "today".to_string(),
            1 => "in 1 day".to_string(),
            d => format!("in {} days", d),
        };
        out.push_str(&format!("{:<11} {}\n", label, amount));
    }
    out
}

fn push_failed_note(msg: &mut String, failed: usize) {
    if failed > 0 {
        msg.push_str(&format!(
            "\nNote: {} validator(s) could not be scanned and count as zero.",
            failed
        ));
    }
}

pub fn wallet_line(address: &str, note: &str, summary: &WalletSummary) -> String {
    format!(
        "{} ({})\n  balance:   {}\n  staked:    {}\n  unbonding: {}",
        address, note, summary.balance, summary.staked, summary.unbonding
    )
}

pub fn wallet_error_line(address: &str, note: &str) -> String {
    format!("{} ({})\n  lookup failed", address, note)
}

pub fn coreteam(lines: &[String]) -> String {
    format!("Core team wallets:\n\n{}", lines.join("\n\n"))
}

pub fn decoy(report: &DecoyReport) -> String {
    if report.is_empty() {
        return "No decoy orders detected.".to_string();
    }
    let mut msg = if report.triggers() {
        format!("Decoy alert: {} small orders on the book:\n", report.decoy_count)
    } else {
        format!("{} small orders on the book (below alert threshold):\n", report.decoy_count)
    };
    for (price, qty) in &report.levels {
        msg.push_str(&format!("  price {} - qty {}\n", price, format_amount(*qty, 0)));
    }
    if report.hidden_levels > 0 {
        msg.push_str(&format!("...{} more price levels not shown", report.hidden_levels));
    }
    msg
}

pub fn book(symbol: &str, summary: &BookSummary) -> String {
    let ratio = match summary.ask_bid_ratio {
        Some(r) => format!("{:.4}x", r),
        None => "n/a (no bids)".to_string(),
    };
    let verdict = match summary.pressure {
        Pressure::SellHeavy => "Sell pressure dominates.",
        Pressure::BuyHeavy => "Buy side is stronger.",
        Pressure::Balanced => "Book is balanced.",
    };

    let mut msg = format!(
        "Orderbook {}\n\
         Total asks: {}\n\
         Total bids: {}\n\
         Ask/bid ratio: {}\n\
         {}\n",
        symbol,
        format_amount(summary.total_asks, 2),
        format_amount(summary.total_bids, 2),
        ratio,
        verdict,
    );

    msg.push_str("\nTop asks:\n");
    for (price, qty) in &summary.top_asks {
        msg.push_str(&format!("  {} | {}\n", price, format_amount(*qty, 2)));
    }
    msg.push_str("Top bids:\n");
    for (price, qty) in &summary.top_bids {
        msg.push_str(&format!("  {} | {}\n", price, format_amount(*qty, 2)));
    }
    msg
}

pub fn walls(report: &WallReport, band_pct: f64) -> String {
    let verdict = match report.verdict {
        WallVerdict::SupportBelow => "Support walls dominate below the price.",
        WallVerdict::ResistanceAbove => "Resistance walls dominate above the price.",
        WallVerdict::Balanced => "No side clearly dominates.",
    };
    format!(
        "Walls within ±{:.1}% of {:.6}:\n\
         support (bids): {}\n\
         resistance (asks): {}\n\
         {}",
        band_pct * 100.0,
        report.reference_price,
        format_amount(report.support_qty, 0),
        format_amount(report.resistance_qty, 0),
        verdict,
    )
}

pub fn flow(delta: Option<&FlowDelta>) -> String {
    let Some(d) = delta else {
        return "First snapshot stored. Run /flow again later to see the change.".to_string();
    };
    let verdict = match d.verdict {
        FlowVerdict::SellInflow => "More sell volume added: downward pressure.",
        FlowVerdict::BuyInflow => "More buy volume added: price support building.",
        FlowVerdict::Neutral => "No clear inflow either way.",
    };
    format!(
        "Orderbook flow over {:.1} min:\n\
         asks: {} -> {} ({:+.2})\n\
         bids: {} -> {} ({:+.2})\n\
         {}",
        d.elapsed_minutes,
        format_amount(d.previous.total_asks, 2),
        format_amount(d.current.total_asks, 2),
        d.asks_diff,
        format_amount(d.previous.total_bids, 2),
        format_amount(d.current.total_bids, 2),
        d.bids_diff,
        verdict,
    )
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "UP",
        Direction::Down => "DOWN",
        Direction::Sideways => "SIDEWAYS",
    }
}

pub fn trend(report: &TrendReport) -> String {
    let mut msg = String::from("Trend by window:\n");
    for w in &report.windows {
        msg.push_str(&format!(
            "{:>4}: {} (MA{} {:.6} / MA{} {:.6}, momentum {:+.2}%, votes {}-{})\n",
            w.label,
            direction_label(w.direction),
            heli_engine::SHORT_MA,
            w.short_ma,
            heli_engine::LONG_MA,
            w.long_ma,
            w.momentum_pct,
            w.votes_up,
            w.votes_down,
        ));
    }
    if report.windows.is_empty() {
        msg.push_str("(no window had enough candles)\n");
    }
    msg.push_str(&format!("\nOverall: {}", direction_label(report.overall)));
    msg
}

pub fn status(block: &BlockStatus) -> String {
    format!(
        "Network status:\nblock height: {}\nproposer: {}",
        block.height, block.proposer_address
    )
}

pub fn validators(counts: &ValidatorCounts) -> String {
    format!(
        "Validators: {} total, {} bonded, {} jailed",
        counts.total, counts.bonded, counts.jailed
    )
}

pub fn validator_info(validator: Option<&Validator>, valoper: &str) -> String {
    match validator {
        Some(v) => format!(
            "{}\nmoniker: {}\nstatus: {}{}\nstake: {}\ncommission: {:.2}%",
            v.operator_address,
            v.description.moniker,
            v.status,
            if v.jailed { " (jailed)" } else { "" },
            v.tokens_or_zero(),
            v.commission_rate() * 100.0,
        ),
        None => format!("Validator {} not found.", valoper),
    }
}

pub fn delegations(address: &str, delegations: &[DelegationResponse]) -> String {
    if delegations.is_empty() {
        return format!("{} has no delegations.", address);
    }
    let mut total = Amount::ZERO;
    let mut msg = format!("Delegations of {}:\n", address);
    for d in delegations {
        let amount = d.balance.amount_or_zero();
        total += amount;
        msg.push_str(&format!("  {} - {}\n", d.delegation.validator_address, amount));
    }
    msg.push_str(&format!("total: {}", total));
    msg
}

pub fn wallet_unbonding(address: &str, responses: &[UnbondingDelegation]) -> String {
    let mut total = Amount::ZERO;
    let mut entries = 0usize;
    for r in responses {
        for e in &r.entries {
            total += Amount::parse(&e.balance).unwrap_or(Amount::ZERO);
            entries += 1;
        }
    }
    if entries == 0 {
        return format!("{} has nothing unbonding.", address);
    }
    format!("{} is unbonding {} across {} entries.", address, total, entries)
}

pub fn whoami(user_id: i64, allowed: bool, admin: bool) -> String {
    let role = if admin {
        "admin"
    } else if allowed {
        "authorized"
    } else {
        "not authorized"
    };
    format!("Your id: {} ({})", user_id, role)
}
