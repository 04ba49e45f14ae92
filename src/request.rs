use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, RoundingPolicy};
use crate::errors::Result;
use crate::payments::{PrepaymentEvent, PrepaymentSchedule, RecurringPrepaymentRule};
use crate::types::{LoanTerms, LoanType, RepaymentMethod};

/// calculation request for a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepayRequest {
    #[serde(alias = "loanTotal")]
    pub principal: Decimal,
    /// annual rate in percent, e.g. 4.9
    #[serde(alias = "annualRate")]
    pub annual_rate_percent: Decimal,
    pub years: u32,
    #[serde(default)]
    pub method: RepaymentMethod,
    #[serde(default, alias = "reservedPrincipal")]
    pub reserved_principal: Decimal,
    #[serde(default)]
    pub prepayments: Vec<PrepaymentEvent>,
    #[serde(default, alias = "periodicRepayList")]
    pub periodic_prepayments: Vec<RecurringPrepaymentRule>,
}

impl RepayRequest {
    pub fn new(principal: Decimal, annual_rate_percent: Decimal, years: u32, method: RepaymentMethod) -> Self {
        Self {
            principal,
            annual_rate_percent,
            years,
            method,
            reserved_principal: Decimal::ZERO,
            prepayments: Vec::new(),
            periodic_prepayments: Vec::new(),
        }
    }

    pub fn with_reserved_principal(mut self, reserved: Decimal) -> Self {
        self.reserved_principal = reserved;
        self
    }

    pub fn with_prepayment(mut self, month: i64, amount: Decimal) -> Self {
        self.prepayments.push(PrepaymentEvent::new(month, amount));
        self
    }

    pub fn with_periodic_prepayment(mut self, rule: RecurringPrepaymentRule) -> Self {
        self.periodic_prepayments.push(rule);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// validated loan terms with amounts rounded to money
    pub fn terms(&self, rounding: &RoundingPolicy) -> Result<LoanTerms> {
        LoanTerms::from_years(
            rounding.money(self.principal),
            self.annual_rate_percent,
            self.years,
            rounding.money(self.reserved_principal),
        )
    }

    pub fn prepayment_schedule(&self) -> PrepaymentSchedule {
        PrepaymentSchedule::new(self.prepayments.clone(), self.periodic_prepayments.clone())
    }
}

/// calculation request for a commercial loan, a housing-fund loan, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationLoanRequest {
    #[serde(alias = "loanType")]
    pub loan_type: LoanType,
    pub method: RepaymentMethod,

    #[serde(alias = "businessLoanTotal")]
    pub commercial_principal: Decimal,
    #[serde(alias = "businessAnnualRate")]
    pub commercial_rate_percent: Decimal,
    #[serde(alias = "businessYears")]
    pub commercial_years: u32,

    #[serde(alias = "fundLoanTotal")]
    pub fund_principal: Decimal,
    #[serde(alias = "fundAnnualRate")]
    pub fund_rate_percent: Decimal,
    #[serde(alias = "fundYears")]
    pub fund_years: u32,

    /// applies to each sub-loan
    #[serde(alias = "reservedPrincipal")]
    pub reserved_principal: Decimal,
    pub prepayments: Vec<PrepaymentEvent>,
    #[serde(alias = "periodicRepayList")]
    pub periodic_prepayments: Vec<RecurringPrepaymentRule>,
}

impl Default for CombinationLoanRequest {
    fn default() -> Self {
        Self {
            loan_type: LoanType::Combination,
            method: RepaymentMethod::default(),
            commercial_principal: Decimal::ZERO,
            commercial_rate_percent: Decimal::ZERO,
            commercial_years: 0,
            fund_principal: Decimal::ZERO,
            fund_rate_percent: Decimal::ZERO,
            fund_years: 0,
            reserved_principal: Decimal::ZERO,
            prepayments: Vec::new(),
            periodic_prepayments: Vec::new(),
        }
    }
}

impl CombinationLoanRequest {
    pub fn new(loan_type: LoanType, method: RepaymentMethod) -> Self {
        Self {
            loan_type,
            method,
            ..Self::default()
        }
    }

    pub fn with_commercial(mut self, principal: Decimal, rate_percent: Decimal, years: u32) -> Self {
        self.commercial_principal = principal;
        self.commercial_rate_percent = rate_percent;
        self.commercial_years = years;
        self
    }

    pub fn with_fund(mut self, principal: Decimal, rate_percent: Decimal, years: u32) -> Self {
        self.fund_principal = principal;
        self.fund_rate_percent = rate_percent;
        self.fund_years = years;
        self
    }

    pub fn with_reserved_principal(mut self, reserved: Decimal) -> Self {
        self.reserved_principal = reserved;
        self
    }

    pub fn with_prepayment(mut self, month: i64, amount: Decimal) -> Self {
        self.prepayments.push(PrepaymentEvent::new(month, amount));
        self
    }

    pub fn with_periodic_prepayment(mut self, rule: RecurringPrepaymentRule) -> Self {
        self.periodic_prepayments.push(rule);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn commercial_terms(&self, rounding: &RoundingPolicy) -> Result<LoanTerms> {
        LoanTerms::from_years(
            rounding.money(self.commercial_principal),
            self.commercial_rate_percent,
            self.commercial_years,
            self.reserved(rounding),
        )
    }

    pub fn fund_terms(&self, rounding: &RoundingPolicy) -> Result<LoanTerms> {
        LoanTerms::from_years(
            rounding.money(self.fund_principal),
            self.fund_rate_percent,
            self.fund_years,
            self.reserved(rounding),
        )
    }

    pub fn prepayment_schedule(&self) -> PrepaymentSchedule {
        PrepaymentSchedule::new(self.prepayments.clone(), self.periodic_prepayments.clone())
    }

    fn reserved(&self, rounding: &RoundingPolicy) -> Money {
        rounding.money(self.reserved_principal)
    }
}
