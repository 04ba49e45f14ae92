use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::{AmortizationCalculator, LoanResult, PrepaymentMap, ScheduleBuilder};
use crate::request::{CombinationLoanRequest, RepayRequest};
use crate::types::{LoanType, MonthlyEntry, RepaymentMethod, YearlySummary};

/// schedules of a combined commercial and housing-fund request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub loan_type: LoanType,
    pub method: RepaymentMethod,
    pub commercial: Option<LoanResult>,
    pub fund: Option<LoanResult>,
    pub monthly: Vec<MonthlyEntry>,
    pub yearly: Vec<YearlySummary>,
    pub total_months: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl CombinedResult {
    pub fn entry(&self, month: u32) -> Option<&MonthlyEntry> {
        if month == 0 {
            return None;
        }
        self.monthly.get((month - 1) as usize)
    }

    /// leftover prepayments of every sub-loan, keyed by sub-loan name
    pub fn unconsumed_prepayments(&self) -> Vec<(&'static str, &PrepaymentMap)> {
        [("commercial", &self.commercial), ("fund", &self.fund)]
            .into_iter()
            .filter_map(|(name, result)| result.as_ref().map(|r| (name, &r.unconsumed_prepayments)))
            .filter(|(_, map)| !map.is_empty())
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// runs one amortization per sub-loan and merges the schedules
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanAggregator {
    config: EngineConfig,
}

impl LoanAggregator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// amortize a single-loan request
    pub fn calculate_single(&self, request: &RepayRequest) -> Result<LoanResult> {
        let rounding = &self.config.rounding;
        let terms = request.terms(rounding)?;
        let prepayments = request.prepayment_schedule().expand(rounding, terms.term_months);

        AmortizationCalculator::new(request.method, self.config).calculate(&terms, prepayments)
    }

    /// amortize every sub-loan the loan type names and merge them
    pub fn calculate(&self, request: &CombinationLoanRequest) -> Result<CombinedResult> {
        let rounding = &self.config.rounding;
        let calculator = AmortizationCalculator::new(request.method, self.config);

        let commercial_terms = if request.loan_type.includes_commercial() {
            Some(request.commercial_terms(rounding)?)
        } else {
            None
        };
        let fund_terms = if request.loan_type.includes_fund() {
            Some(request.fund_terms(rounding)?)
        } else {
            None
        };

        let last_month = [&commercial_terms, &fund_terms]
            .iter()
            .filter_map(|terms| terms.as_ref())
            .map(|terms| terms.term_months)
            .max()
            .unwrap_or(0);
        let prepayments = request.prepayment_schedule().expand(rounding, last_month);

        debug!(
            "{} loan, {}: {} prepayment months shared by each sub-loan",
            request.loan_type,
            request.method,
            prepayments.len()
        );

        // each run owns its own copy of the prepayments
        let commercial = match &commercial_terms {
            Some(terms) => Some(calculator.calculate(terms, prepayments.clone())?),
            None => None,
        };
        let fund = match &fund_terms {
            Some(terms) => Some(calculator.calculate(terms, prepayments)?),
            None => None,
        };

        Ok(self.merge(request.loan_type, request.method, commercial, fund))
    }

    /// combine sub-loan results month by month
    pub fn merge(
        &self,
        loan_type: LoanType,
        method: RepaymentMethod,
        commercial: Option<LoanResult>,
        fund: Option<LoanResult>,
    ) -> CombinedResult {
        let rounding = self.config.rounding;

        let (monthly, yearly, total_months) = match (&commercial, &fund) {
            (Some(only), None) | (None, Some(only)) => {
                (only.monthly.clone(), only.yearly.clone(), only.terms.term_months)
            }
            (Some(a), Some(b)) => {
                let total_months = a.terms.term_months.max(b.terms.term_months);
                let mut schedule = ScheduleBuilder::new(rounding, total_months as usize);
                for month in 1..=total_months {
                    let parts = [a.entry(month), b.entry(month)];
                    let principal: Money = parts.iter().flatten().map(|e| e.principal).sum();
                    let interest: Money = parts.iter().flatten().map(|e| e.interest).sum();
                    let balance: Money = parts.iter().flatten().map(|e| e.remaining_balance).sum();
                    schedule.record(MonthlyEntry::new(month, principal, interest, balance, &rounding));
                }
                let (monthly, yearly) = schedule.into_parts();
                (monthly, yearly, total_months)
            }
            (None, None) => (Vec::new(), Vec::new(), 0),
        };

        let totals = |pick: fn(&LoanResult) -> Money| -> Money {
            let sum: Money = [&commercial, &fund].iter().filter_map(|r| r.as_ref()).map(pick).sum();
            rounding.normalize(sum)
        };
        let total_principal = totals(|r| r.total_principal);
        let total_interest = totals(|r| r.total_interest);
        let total_payment = totals(|r| r.total_payment);

        debug!(
            "merged {} months: principal {}, interest {}",
            total_months, total_principal, total_interest
        );

        CombinedResult {
            loan_type,
            method,
            commercial,
            fund,
            monthly,
            yearly,
            total_months,
            total_principal,
            total_interest,
            total_payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemainderPolicy;
    use crate::errors::RepayError;
    use crate::payments::RecurringPrepaymentRule;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn combination(method: RepaymentMethod) -> CombinationLoanRequest {
        CombinationLoanRequest::new(LoanType::Combination, method)
            .with_commercial(dec!(1000000), dec!(4.9), 30)
            .with_fund(dec!(500000), dec!(3.1), 20)
    }

    #[test]
    fn test_combination_merges_over_longest_term() {
        let result = LoanAggregator::default()
            .calculate(&combination(RepaymentMethod::EqualPrincipal))
            .unwrap();
        let commercial = result.commercial.as_ref().unwrap();
        let fund = result.fund.as_ref().unwrap();

        assert_eq!(result.total_months, 360);
        assert_eq!(result.monthly.len(), 360);
        assert_eq!(result.yearly.len(), 30);

        let first = result.entry(1).unwrap();
        assert_eq!(first.principal, commercial.monthly[0].principal + fund.monthly[0].principal);
        assert_eq!(first.interest, commercial.monthly[0].interest + fund.monthly[0].interest);
        assert_eq!(
            first.remaining_balance,
            commercial.monthly[0].remaining_balance + fund.monthly[0].remaining_balance
        );

        // only the commercial loan is left after twenty years
        for month in 241..=360 {
            let merged = result.entry(month).unwrap();
            let alone = commercial.entry(month).unwrap();
            assert_eq!(merged.principal, alone.principal, "month {}", month);
            assert_eq!(merged.interest, alone.interest, "month {}", month);
            assert_eq!(merged.remaining_balance, alone.remaining_balance, "month {}", month);
        }

        assert_eq!(result.total_principal, Money::from_major(1_500_000));
        assert_eq!(result.total_interest, commercial.total_interest + fund.total_interest);
        assert_eq!(result.total_payment, result.total_principal + result.total_interest);
        let merged_payments: Money = result.monthly.iter().map(|e| e.payment).sum();
        assert_eq!(merged_payments, result.total_payment);
    }

    #[test]
    fn test_single_passes_commercial_through() {
        let request = CombinationLoanRequest::new(LoanType::Single, RepaymentMethod::EqualInterest)
            .with_commercial(dec!(1000000), dec!(4.9), 30);

        let result = LoanAggregator::default().calculate(&request).unwrap();
        let commercial = result.commercial.as_ref().unwrap();

        assert!(result.fund.is_none());
        assert_eq!(result.monthly, commercial.monthly);
        assert_eq!(result.yearly, commercial.yearly);
        assert_eq!(result.total_payment, commercial.total_payment);
    }

    #[test]
    fn test_fund_ignores_commercial_fields() {
        let request = CombinationLoanRequest::new(LoanType::Fund, RepaymentMethod::EqualPrincipal)
            .with_fund(dec!(500000), dec!(3.1), 20);

        let result = LoanAggregator::default().calculate(&request).unwrap();

        assert!(result.commercial.is_none());
        assert_eq!(result.total_months, 240);
        assert_eq!(result.total_principal, Money::from_major(500_000));
    }

    #[test]
    fn test_each_sub_loan_gets_the_prepayments() {
        let request = combination(RepaymentMethod::EqualInterest).with_prepayment(12, dec!(50000));

        let result = LoanAggregator::default().calculate(&request).unwrap();
        let commercial = result.commercial.as_ref().unwrap();
        let fund = result.fund.as_ref().unwrap();

        assert!(commercial.entry(12).unwrap().principal > Money::from_major(50_000));
        assert!(fund.entry(12).unwrap().principal > Money::from_major(50_000));
        assert_eq!(
            result.entry(12).unwrap().principal,
            commercial.entry(12).unwrap().principal + fund.entry(12).unwrap().principal
        );
    }

    #[test]
    fn test_shorter_loan_paid_off_early_contributes_nothing() {
        let request = CombinationLoanRequest::new(LoanType::Combination, RepaymentMethod::EqualPrincipal)
            .with_commercial(dec!(12000), dec!(6), 1)
            .with_fund(dec!(1200), dec!(3), 1)
            .with_prepayment(2, dec!(5000));
        let aggregator = LoanAggregator::new(EngineConfig::standard().with_remainder_policy(RemainderPolicy::Carry));

        let result = aggregator.calculate(&request).unwrap();
        let fund = result.fund.as_ref().unwrap();

        assert_eq!(fund.monthly.len(), 2);
        assert_eq!(result.monthly.len(), 12);
        assert_eq!(result.entry(3).unwrap().remaining_balance, result.commercial.as_ref().unwrap().entry(3).unwrap().remaining_balance);
        assert_eq!(result.unconsumed_prepayments(), vec![("fund", &fund.unconsumed_prepayments)]);
    }

    #[test]
    fn test_invalid_sub_loan_is_fatal() {
        let request = CombinationLoanRequest::new(LoanType::Combination, RepaymentMethod::EqualPrincipal)
            .with_commercial(dec!(1000000), dec!(4.9), 30);

        let err = LoanAggregator::default().calculate(&request).unwrap_err();

        assert!(matches!(err, RepayError::InvalidTerm { .. }));
    }

    #[test]
    fn test_single_request() {
        let request = RepayRequest::new(dec!(1200000), dec!(4.9), 30, RepaymentMethod::EqualPrincipal)
            .with_prepayment(12, dec!(50000));

        let result = LoanAggregator::default().calculate_single(&request).unwrap();

        assert_eq!(result.entry(1).unwrap().interest.to_string(), "4900.00");
        assert_eq!(result.entry(12).unwrap().principal, Money::from_minor(5_333_333));
    }

    #[test]
    fn test_reserved_principal_applies_to_each_sub_loan() {
        let request = CombinationLoanRequest::new(LoanType::Combination, RepaymentMethod::EqualInterest)
            .with_commercial(dec!(120000), dec!(6), 1)
            .with_fund(dec!(60000), dec!(3), 1)
            .with_reserved_principal(dec!(20000));

        let result = LoanAggregator::default().calculate(&request).unwrap();

        assert_eq!(result.commercial.as_ref().unwrap().final_balance(), Money::from_major(20_000));
        assert_eq!(result.fund.as_ref().unwrap().final_balance(), Money::from_major(20_000));
        assert_eq!(result.entry(12).unwrap().remaining_balance, Money::from_major(40_000));
        assert_eq!(result.total_principal, Money::from_major(140_000));
        assert_eq!(result.total_payment, result.total_principal + result.total_interest);
    }

    #[test]
    fn test_prepayments_limited_to_longest_term() {
        let request = combination(RepaymentMethod::EqualPrincipal)
            .with_periodic_prepayment(RecurringPrepaymentRule::new(1, 3_000_000, 1, dec!(1)))
            .with_prepayment(361, dec!(1000));

        let result = LoanAggregator::default().calculate(&request).unwrap();
        let commercial = result.commercial.as_ref().unwrap();
        let fund = result.fund.as_ref().unwrap();

        assert!(commercial.unconsumed_prepayments.is_empty());
        // the shorter loan never reaches months 241..=360
        assert_eq!(fund.unconsumed_prepayments.len(), 120);
        assert!(fund.unconsumed_prepayments.iter().all(|(month, _)| (241..=360).contains(&month)));
        assert_eq!(commercial.total_principal, Money::from_major(1_000_000));
        assert_eq!(commercial.entry(1).unwrap().principal, Money::from_minor(277878));
    }
}
