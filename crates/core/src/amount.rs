//! Token amounts in the chain's micro-denomination.

use serde::{Deserialize, Serialize};

/// Micro-units per display unit (1 HELI = 1,000,000 uheli).
pub const MICRO_PER_HELI: u64 = 1_000_000;

/// An amount in uheli, the chain's smallest unit.
///
/// The LCD encodes these as decimal strings. Amounts are never negative
/// on chain, so they are stored unsigned. Accumulation uses saturating
/// arithmetic: a sum that overflows u64 would be far beyond total supply,
/// so clamping is safer than wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Parse from the LCD's string encoding. Returns None for anything
    /// that is not a plain non-negative integer.
    pub fn parse(s: &str) -> Option<Amount> {
        s.trim().parse::<u64>().ok().map(Amount)
    }

    /// Convert to display units (HELI).
    pub fn to_heli(self) -> f64 {
        self.0 as f64 / MICRO_PER_HELI as f64
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, other: Amount) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} HELI", format_amount(self.to_heli(), 2))
    }
}

/// Format a display-unit value with thousands grouping.
///
/// `format_amount(1234567.891, 2)` -> `"1,234,567.89"`.
pub fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
