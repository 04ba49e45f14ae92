use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepayError {
    #[error("invalid term: {message}")]
    InvalidTerm {
        message: String,
    },

    #[error("invalid recurring prepayment rule #{index}: {reason}")]
    InvalidPrepaymentRule {
        index: usize,
        reason: String,
    },

    #[error("invalid prepayment at month {month}: amount {amount}")]
    InvalidPrepayment {
        month: i64,
        amount: Money,
    },

    #[error("arithmetic error: {message}")]
    Arithmetic {
        message: String,
    },

    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl From<serde_json::Error> for RepayError {
    fn from(err: serde_json::Error) -> Self {
        RepayError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepayError>;
