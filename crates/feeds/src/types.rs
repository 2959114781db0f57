//! Typed envelopes for the Cosmos LCD staking/bank/mint endpoints.
//!
//! Every field defaults when absent: a missing list is an empty list and a
//! missing amount is zero, never a decode failure. Balances stay as the
//! LCD's string encoding here; parsing happens at the aggregation layer so
//! a single malformed entry can be skipped instead of failing the page.

use heli_core::Amount;
use serde::Deserialize;

/// `pagination` object carried by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_key: Option<String>,
}

/// A denom/amount pair from the bank module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coin {
    #[serde(default)]
    pub denom: String,
    #[serde(default)]
    pub amount: String,
}

impl Coin {
    /// Parsed amount, zero when malformed or absent.
    pub fn amount_or_zero(&self) -> Amount {
        Amount::parse(&self.amount).unwrap_or(Amount::ZERO)
    }
}

/// `/cosmos/staking/v1beta1/pool`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakingPool {
    #[serde(default)]
    pub bonded_tokens: String,
    #[serde(default)]
    pub not_bonded_tokens: String,
}

impl StakingPool {
    pub fn bonded(&self) -> Amount {
        Amount::parse(&self.bonded_tokens).unwrap_or(Amount::ZERO)
    }

    pub fn not_bonded(&self) -> Amount {
        Amount::parse(&self.not_bonded_tokens).unwrap_or(Amount::ZERO)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidatorDescription {
    #[serde(default)]
    pub moniker: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommissionRates {
    #[serde(default)]
    pub rate: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Commission {
    #[serde(default)]
    pub commission_rates: CommissionRates,
}

/// A validator record from `/cosmos/staking/v1beta1/validators`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Validator {
    #[serde(default)]
    pub operator_address: String,
    #[serde(default)]
    pub jailed: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tokens: String,
    #[serde(default)]
    pub description: ValidatorDescription,
    #[serde(default)]
    pub commission: Commission,
}

impl Validator {
    pub fn is_bonded(&self) -> bool {
        self.status == "BOND_STATUS_BONDED"
    }

    /// Staked tokens, zero when malformed.
    pub fn tokens_or_zero(&self) -> Amount {
        Amount::parse(&self.tokens).unwrap_or(Amount::ZERO)
    }

    /// Commission rate as a fraction in [0, 1], zero when malformed.
    pub fn commission_rate(&self) -> f64 {
        self.commission
            .commission_rates
            .rate
            .trim()
            .parse::<f64>()
            .unwrap_or(0.0)
    }
}

/// One unbonding entry: a balance cooling down until `completion_time`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnbondingEntry {
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub completion_time: String,
}

/// All unbonding entries of one delegator against one validator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnbondingDelegation {
    #[serde(default)]
    pub delegator_address: String,
    #[serde(default)]
    pub entries: Vec<UnbondingEntry>,
}

/// One delegation of a wallet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelegationResponse {
    #[serde(default)]
    pub balance: Coin,
    #[serde(default)]
    pub delegation: Delegation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delegation {
    #[serde(default)]
    pub validator_address: String,
}

/// Latest block header fields used by the status report.
#[derive(Debug, Clone, Default)]
pub struct BlockStatus {
    pub height: String,
    pub proposer_address: String,
}

// Wire envelopes. These stay private to the client module's decode step
// conceptually, but the mock adapter in engine tests builds them too.

#[derive(Debug, Default, Deserialize)]
pub struct PoolResponse {
    #[serde(default)]
    pub pool: StakingPool,
}

#[derive(Debug, Default, Deserialize)]
pub struct InflationResponse {
    #[serde(default)]
    pub inflation: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplyResponse {
    #[serde(default)]
    pub supply: Vec<Coin>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<Coin>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidatorsResponse {
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidatorResponse {
    #[serde(default)]
    pub validator: Option<Validator>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnbondingDelegationsResponse {
    #[serde(default)]
    pub unbonding_responses: Vec<UnbondingDelegation>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct DelegationsResponse {
    #[serde(default)]
    pub delegation_responses: Vec<DelegationResponse>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockResponse {
    #[serde(default)]
    pub block: Block,
}

#[derive(Debug, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub header: BlockHeader,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockHeader {
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub proposer_address: String,
}
