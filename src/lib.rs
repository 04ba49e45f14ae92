pub mod combination;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod payments;
pub mod request;
pub mod types;

// re-export key types
pub use combination::{CombinedResult, LoanAggregator};
pub use config::{EngineConfig, RemainderPolicy, TrailingMonths};
pub use decimal::{Money, Rate, RoundingMode, RoundingPolicy};
pub use errors::{RepayError, Result};
pub use payments::{
    AmortizationCalculator, AmortizationStrategy, EqualInterestEngine, EqualPrincipalEngine,
    LoanResult, PrepaymentEvent, PrepaymentMap, PrepaymentSchedule, RecurringPrepaymentRule,
};
pub use request::{CombinationLoanRequest, RepayRequest};
pub use types::{LoanTerms, LoanType, MonthlyEntry, RepaymentMethod, YearlySummary};

// re-export external dependencies that users will need
pub use rust_decimal::Decimal;
