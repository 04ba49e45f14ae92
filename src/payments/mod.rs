pub mod equal_interest;
pub mod equal_principal;
pub mod prepayment;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, RoundingPolicy};
use crate::errors::Result;
use crate::types::{LoanTerms, MonthlyEntry, RepaymentMethod, YearlySummary};

pub use equal_interest::{annuity_installment, EqualInterestEngine};
pub use equal_principal::EqualPrincipalEngine;
pub use prepayment::{PrepaymentEvent, PrepaymentMap, PrepaymentSchedule, RecurringPrepaymentRule};

/// one way of turning loan terms into a repayment schedule
pub trait AmortizationStrategy {
    fn method(&self) -> RepaymentMethod;

    /// amortize a loan; the prepayment map is owned by this run and whatever
    /// it could not consume is returned in the result
    fn amortize(&self, terms: &LoanTerms, prepayments: PrepaymentMap) -> Result<LoanResult>;
}

/// complete schedule for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub terms: LoanTerms,
    pub method: RepaymentMethod,
    pub monthly: Vec<MonthlyEntry>,
    pub yearly: Vec<YearlySummary>,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    /// months until the balance reached the reserved floor
    pub effective_term_months: u32,
    /// regular payment of the first month, before any prepayment
    pub initial_installment: Money,
    pub unconsumed_prepayments: PrepaymentMap,
}

impl LoanResult {
    /// entry for a 1-based month
    pub fn entry(&self, month: u32) -> Option<&MonthlyEntry> {
        if month == 0 {
            return None;
        }
        self.monthly.get((month - 1) as usize)
    }

    /// remaining balance after a month; the original principal before month 1
    pub fn balance_after(&self, month: u32) -> Money {
        if month == 0 {
            return self.terms.principal;
        }
        self.entry(month)
            .map(|e| e.remaining_balance)
            .or_else(|| self.monthly.last().map(|e| e.remaining_balance))
            .unwrap_or(self.terms.principal)
    }

    pub fn final_balance(&self) -> Money {
        self.monthly
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(self.terms.principal)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// amortization calculator selecting a strategy by method
pub struct AmortizationCalculator {
    method: RepaymentMethod,
    config: EngineConfig,
}

impl AmortizationCalculator {
    pub fn new(method: RepaymentMethod, config: EngineConfig) -> Self {
        Self { method, config }
    }

    pub fn method(&self) -> RepaymentMethod {
        self.method
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// calculate full repayment schedule
    pub fn calculate(&self, terms: &LoanTerms, prepayments: PrepaymentMap) -> Result<LoanResult> {
        match self.method {
            RepaymentMethod::EqualPrincipal => EqualPrincipalEngine::new(self.config).amortize(terms, prepayments),
            RepaymentMethod::EqualInterest => EqualInterestEngine::new(self.config).amortize(terms, prepayments),
        }
    }
}

/// accumulates monthly entries, yearly summaries and totals
pub(crate) struct ScheduleBuilder {
    rounding: RoundingPolicy,
    monthly: Vec<MonthlyEntry>,
    yearly: Vec<YearlySummary>,
    year_principal: Money,
    year_interest: Money,
    total_principal: Money,
    total_interest: Money,
    effective_term_months: u32,
}

impl ScheduleBuilder {
    pub(crate) fn new(rounding: RoundingPolicy, capacity: usize) -> Self {
        Self {
            rounding,
            monthly: Vec::with_capacity(capacity),
            yearly: Vec::new(),
            year_principal: Money::ZERO,
            year_interest: Money::ZERO,
            total_principal: Money::ZERO,
            total_interest: Money::ZERO,
            effective_term_months: 0,
        }
    }

    /// record a month in which the loan was still being repaid
    pub(crate) fn push(&mut self, month: u32, principal: Money, interest: Money, remaining_balance: Money) {
        self.effective_term_months = month;
        self.record(MonthlyEntry::new(month, principal, interest, remaining_balance, &self.rounding));
    }

    /// record a month after payoff with nothing due
    pub(crate) fn push_trailing(&mut self, month: u32, remaining_balance: Money) {
        self.record(MonthlyEntry::new(month, Money::ZERO, Money::ZERO, remaining_balance, &self.rounding));
    }

    /// append an already computed entry, e.g. a merged month
    pub(crate) fn record(&mut self, entry: MonthlyEntry) {
        self.year_principal += entry.principal;
        self.year_interest += entry.interest;
        self.total_principal += entry.principal;
        self.total_interest += entry.interest;

        if entry.month % 12 == 0 {
            self.yearly.push(YearlySummary {
                year: entry.month / 12,
                principal: self.rounding.normalize(self.year_principal),
                interest: self.rounding.normalize(self.year_interest),
                total: self.rounding.normalize(self.year_principal + self.year_interest),
            });
            self.year_principal = Money::ZERO;
            self.year_interest = Money::ZERO;
        }

        self.monthly.push(entry);
    }

    pub(crate) fn total_principal(&self) -> Money {
        self.rounding.normalize(self.total_principal)
    }

    pub(crate) fn total_interest(&self) -> Money {
        self.rounding.normalize(self.total_interest)
    }

    pub(crate) fn total_payment(&self) -> Money {
        self.rounding.normalize(self.total_principal + self.total_interest)
    }

    pub(crate) fn into_parts(self) -> (Vec<MonthlyEntry>, Vec<YearlySummary>) {
        (self.monthly, self.yearly)
    }

    pub(crate) fn finish(
        self,
        terms: &LoanTerms,
        method: RepaymentMethod,
        initial_installment: Money,
        unconsumed_prepayments: PrepaymentMap,
    ) -> LoanResult {
        let total_principal = self.total_principal();
        let total_interest = self.total_interest();
        let total_payment = self.total_payment();
        let effective_term_months = self.effective_term_months;
        let initial_installment = self.rounding.normalize(initial_installment);
        let (monthly, yearly) = self.into_parts();

        LoanResult {
            terms: terms.clone(),
            method,
            monthly,
            yearly,
            total_principal,
            total_interest,
            total_payment,
            effective_term_months,
            initial_installment,
            unconsumed_prepayments,
        }
    }
}
