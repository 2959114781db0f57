//! Derived staking metrics: bonded ratio and APY estimate.
//!
//! These are advisory display metrics, recomputed from fresh inputs on
//! every request. Denominators are checked before the arithmetic; a zero
//! denominator yields "unavailable" (None), never infinity or a panic.

use heli_core::Amount;
use heli_feeds::types::Validator;

/// Bonded ratio as a percentage (bonded / supply * 100).
/// None when the supply is zero.
pub fn bonded_ratio_pct(bonded: Amount, supply: Amount) -> Option<f64> {
    if supply.is_zero() {
        return None;
    }
    Some(bonded.0 as f64 / supply.0 as f64 * 100.0)
}

/// The highest-stake validator; ties keep the first one seen.
pub fn top_validator_by_stake(validators: &[Validator]) -> Option<&Validator> {
    let mut top: Option<&Validator> = None;
    for validator in validators {
        match top {
            Some(current) if validator.tokens_or_zero() <= current.tokens_or_zero() => {}
            _ => top = Some(validator),
        }
    }
    top
}

/// APY estimate with the inputs that produced it.
#[derive(Debug, Clone)]
pub struct ApyEstimate {
    pub apy_pct: f64,
    /// Inflation as a fraction.
    pub inflation: f64,
    /// Bonded ratio as a fraction.
    pub bonded_ratio: f64,
    /// Commission of the proxy validator, as a fraction.
    pub commission: f64,
    pub validator_moniker: String,
    pub validator_stake: Amount,
}

/// Estimate the net staking APY.
///
/// APY = (inflation / bonded_ratio) * (1 - commission) * 100, using the
/// top-stake validator's commission as a proxy for typical yield. This is
/// a deliberate approximation, not a network-wide average. None when the
/// bonded ratio cannot be computed, is zero, or no validator exists.
pub fn staking_apy(
    inflation: f64,
    bonded: Amount,
    supply: Amount,
    validators: &[Validator],
) -> Option<ApyEstimate> {
    let bonded_ratio = bonded_ratio_pct(bonded, supply)? / 100.0;
    if bonded_ratio <= 0.0 {
        return None;
    }
    let top = top_validator_by_stake(validators)?;
    let commission = top.commission_rate();

    Some(ApyEstimate {
        apy_pct: inflation / bonded_ratio * (1.0 - commission) * 100.0,
        inflation,
        bonded_ratio,
        commission,
        validator_moniker: top.description.moniker.clone(),
        validator_stake: top.tokens_or_zero(),
    })
}

/// Validator set counts for the status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorCounts {
    pub total: usize,
    pub bonded: usize,
    pub jailed: usize,
}

pub fn count_validators(validators: &[Validator]) -> ValidatorCounts {
    ValidatorCounts {
        total: validators.len(),
        bonded: validators.iter().filter(|v| v.is_bonded() && !v.jailed).count(),
        jailed: validators.iter().filter(|v| v.jailed).count(),
    }
}
