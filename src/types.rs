use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Money, Rate, RoundingPolicy};
use crate::errors::{RepayError, Result};

/// repayment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// principal split over the remaining months, interest on the remaining balance
    #[default]
    #[serde(alias = "equalPrincipal")]
    EqualPrincipal,
    /// fixed installment from the annuity formula
    #[serde(alias = "equalInterest")]
    EqualInterest,
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepaymentMethod::EqualPrincipal => write!(f, "equal_principal"),
            RepaymentMethod::EqualInterest => write!(f, "equal_interest"),
        }
    }
}

impl FromStr for RepaymentMethod {
    type Err = RepayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "equal_principal" | "equalPrincipal" => Ok(RepaymentMethod::EqualPrincipal),
            "equal_interest" | "equalInterest" => Ok(RepaymentMethod::EqualInterest),
            other => Err(RepayError::InvalidConfiguration {
                message: format!("unknown repayment method '{}'", other),
            }),
        }
    }
}

/// which sub-loans a combined request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    /// commercial loan only
    Single,
    /// housing-fund loan only
    Fund,
    /// commercial and housing-fund loans together
    Combination,
}

impl LoanType {
    pub fn includes_commercial(&self) -> bool {
        matches!(self, LoanType::Single | LoanType::Combination)
    }

    pub fn includes_fund(&self) -> bool {
        matches!(self, LoanType::Fund | LoanType::Combination)
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanType::Single => write!(f, "single"),
            LoanType::Fund => write!(f, "fund"),
            LoanType::Combination => write!(f, "combination"),
        }
    }
}

impl FromStr for LoanType {
    type Err = RepayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(LoanType::Single),
            "fund" => Ok(LoanType::Fund),
            "combination" => Ok(LoanType::Combination),
            other => Err(RepayError::InvalidConfiguration {
                message: format!("unknown loan type '{}'", other),
            }),
        }
    }
}

/// immutable terms of one loan for one calculation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    /// balance floor that is never repaid
    pub reserved_principal: Money,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32, reserved_principal: Money) -> Result<Self> {
        let terms = Self {
            principal,
            annual_rate,
            term_months,
            reserved_principal,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// build terms from a rate in percent and a term in whole years
    pub fn from_years(principal: Money, annual_rate_percent: Decimal, years: u32, reserved_principal: Money) -> Result<Self> {
        let term_months = years.checked_mul(12).ok_or_else(|| RepayError::InvalidTerm {
            message: format!("{} years overflows the month count", years),
        })?;
        Self::new(principal, Rate::from_percent(annual_rate_percent), term_months, reserved_principal)
    }

    pub fn validate(&self) -> Result<()> {
        if self.term_months == 0 {
            return Err(RepayError::InvalidTerm {
                message: "term must be at least one month".to_string(),
            });
        }
        if self.principal.is_negative() {
            return Err(RepayError::InvalidLoanTerms {
                message: format!("principal {} is negative", self.principal),
            });
        }
        if self.annual_rate.is_negative() {
            return Err(RepayError::InvalidInterestRate { rate: self.annual_rate });
        }
        if self.reserved_principal.is_negative() {
            return Err(RepayError::InvalidLoanTerms {
                message: format!("reserved principal {} is negative", self.reserved_principal),
            });
        }
        if self.reserved_principal > self.principal {
            return Err(RepayError::InvalidLoanTerms {
                message: format!(
                    "reserved principal {} exceeds principal {}",
                    self.reserved_principal, self.principal
                ),
            });
        }
        Ok(())
    }

    /// portion of the principal that is actually repaid
    pub fn repayable(&self) -> Money {
        self.principal.saturating_sub(self.reserved_principal)
    }
}

/// one month of a repayment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    pub month: u32,
    /// scheduled principal plus any prepayment applied this month
    pub principal: Money,
    pub interest: Money,
    pub payment: Money,
    pub remaining_balance: Money,
}

impl MonthlyEntry {
    pub fn new(month: u32, principal: Money, interest: Money, remaining_balance: Money, rounding: &RoundingPolicy) -> Self {
        Self {
            month,
            principal: rounding.normalize(principal),
            interest: rounding.normalize(interest),
            payment: rounding.normalize(principal + interest),
            remaining_balance: rounding.normalize(remaining_balance),
        }
    }
}

/// totals for one full year of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: u32,
    pub principal: Money,
    pub interest: Money,
    pub total: Money,
}
