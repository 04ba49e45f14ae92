use serde::{Deserialize, Serialize};

use crate::decimal::RoundingPolicy;
use crate::errors::Result;

/// engine configuration shared by both repayment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rounding: RoundingPolicy,
    pub remainder_policy: RemainderPolicy,
    pub trailing_months: TrailingMonths,
}

/// what happens to the part of a prepayment that would push the balance
/// below the reserved principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// discard the remainder
    #[default]
    Drop,
    /// move the remainder to the following month
    Carry,
}

/// months left in the nominal term once the balance has reached the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailingMonths {
    /// stop the schedule at the payoff month
    #[default]
    Omit,
    /// keep emitting zero-principal, zero-interest months up to the term
    ZeroFill,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    /// two-place half-up money, remainders dropped, schedule ends at payoff
    pub fn standard() -> Self {
        Self {
            rounding: RoundingPolicy::standard(),
            remainder_policy: RemainderPolicy::Drop,
            trailing_months: TrailingMonths::Omit,
        }
    }

    /// carry unconsumed prepayment remainders forward
    pub fn carry_remainder() -> Self {
        Self {
            remainder_policy: RemainderPolicy::Carry,
            ..Self::standard()
        }
    }

    /// always emit the full nominal term
    pub fn full_term() -> Self {
        Self {
            trailing_months: TrailingMonths::ZeroFill,
            ..Self::standard()
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    pub fn with_trailing_months(mut self, trailing: TrailingMonths) -> Self {
        self.trailing_months = trailing;
        self
    }

    /// parse configuration from json; missing fields fall back to `standard()`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
