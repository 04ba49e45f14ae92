use log::{debug, trace};

use crate::config::{EngineConfig, TrailingMonths};
use crate::errors::Result;
use crate::types::{LoanTerms, RepaymentMethod};

use super::{AmortizationStrategy, LoanResult, PrepaymentMap, ScheduleBuilder};

/// declining installments: the repayable balance is split evenly over the
/// months left, interest is charged on the full opening balance
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualPrincipalEngine {
    config: EngineConfig,
}

impl EqualPrincipalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl AmortizationStrategy for EqualPrincipalEngine {
    fn method(&self) -> RepaymentMethod {
        RepaymentMethod::EqualPrincipal
    }

    fn amortize(&self, terms: &LoanTerms, mut prepayments: PrepaymentMap) -> Result<LoanResult> {
        terms.validate()?;

        let rounding = &self.config.rounding;
        let monthly_rate = rounding.monthly_rate(terms.annual_rate);
        let floor = rounding.normalize(terms.reserved_principal);
        let mut balance = rounding.normalize(terms.principal);
        let mut schedule = ScheduleBuilder::new(*rounding, terms.term_months as usize);
        let mut initial_installment = None;

        debug!(
            "equal principal: {} over {} months at {} monthly, floor {}, {} prepayment months",
            balance,
            terms.term_months,
            monthly_rate,
            floor,
            prepayments.len()
        );

        for month in 1..=terms.term_months {
            if balance <= floor {
                match self.config.trailing_months {
                    TrailingMonths::Omit => break,
                    TrailingMonths::ZeroFill => {
                        schedule.push_trailing(month, balance);
                        continue;
                    }
                }
            }

            let months_left = terms.term_months - (month - 1);
            let headroom = balance - floor;
            let scheduled = rounding.per_period(headroom, months_left)?.min(headroom);
            let interest = rounding.interest(balance, monthly_rate);
            initial_installment.get_or_insert(scheduled + interest);

            balance -= scheduled;
            let extra = prepayments.apply_clamped(month, balance, floor, self.config.remainder_policy);
            balance -= extra;

            trace!(
                "month {}: principal {} (prepaid {}), interest {}, balance {}",
                month,
                scheduled + extra,
                extra,
                interest,
                balance
            );
            schedule.push(month, scheduled + extra, interest, balance);
        }

        let result = schedule.finish(
            terms,
            self.method(),
            initial_installment.unwrap_or_default(),
            prepayments,
        );
        debug!(
            "equal principal: repaid {} in {} months, interest {}",
            result.total_principal, result.effective_term_months, result.total_interest
        );
        Ok(result)
    }
}
