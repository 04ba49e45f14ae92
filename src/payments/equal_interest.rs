use log::{debug, trace};
use rust_decimal::Decimal;

use crate::config::{EngineConfig, TrailingMonths};
use crate::decimal::{discount_factor, Money, RoundingPolicy};
use crate::errors::{RepayError, Result};
use crate::types::{LoanTerms, RepaymentMethod};

use super::{AmortizationStrategy, LoanResult, PrepaymentMap, ScheduleBuilder};

/// fixed monthly installment for `amount` over `months` at a periodic rate
///
/// M = A * r / (1 - (1+r)^-n), or A / n at a zero rate
pub fn annuity_installment(amount: Money, periodic_rate: Decimal, months: u32, rounding: &RoundingPolicy) -> Result<Money> {
    if months == 0 {
        return Err(RepayError::Arithmetic {
            message: "annuity over zero months".to_string(),
        });
    }
    if periodic_rate.is_zero() {
        return rounding.per_period(amount, months);
    }

    let discount = discount_factor(periodic_rate, months)?;
    let numerator = amount
        .as_decimal()
        .checked_mul(periodic_rate)
        .ok_or_else(|| RepayError::Arithmetic {
            message: format!("overflow computing installment for {} over {} months", amount, months),
        })?;
    let installment = rounding.divide(numerator, Decimal::ONE - discount)?;

    Ok(rounding.money(installment))
}

/// constant installments from the annuity formula, recomputed after every
/// prepayment over the months still remaining
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualInterestEngine {
    config: EngineConfig,
}

impl EqualInterestEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// annuity on the repayable part plus interest-only on the reserved part
    fn installment(&self, balance: Money, floor: Money, periodic_rate: Decimal, months: u32) -> Result<Money> {
        let rounding = &self.config.rounding;
        let repayable = balance.saturating_sub(floor);
        let annuity = annuity_installment(repayable, periodic_rate, months, rounding)?;
        if floor.is_zero() {
            return Ok(annuity);
        }
        Ok(rounding.money(annuity.as_decimal() + floor.as_decimal() * periodic_rate))
    }
}

impl AmortizationStrategy for EqualInterestEngine {
    fn method(&self) -> RepaymentMethod {
        RepaymentMethod::EqualInterest
    }

    fn amortize(&self, terms: &LoanTerms, mut prepayments: PrepaymentMap) -> Result<LoanResult> {
        terms.validate()?;

        let rounding = &self.config.rounding;
        let monthly_rate = rounding.monthly_rate(terms.annual_rate);
        let floor = rounding.normalize(terms.reserved_principal);
        let mut balance = rounding.normalize(terms.principal);
        let mut schedule = ScheduleBuilder::new(*rounding, terms.term_months as usize);

        let initial_installment = self.installment(balance, floor, monthly_rate, terms.term_months)?;
        let mut installment = initial_installment;

        debug!(
            "equal interest: {} over {} months at {} monthly, floor {}, installment {}",
            balance, terms.term_months, monthly_rate, floor, installment
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

            let opening = balance;
            let extra = prepayments.apply_clamped(month, balance, floor, self.config.remainder_policy);
            if extra.is_positive() {
                balance -= extra;
                let months_left = terms.term_months - month;
                installment = if months_left > 0 && balance > floor {
                    self.installment(balance, floor, monthly_rate, months_left)?
                } else {
                    Money::ZERO
                };
                debug!("month {}: prepaid {}, installment now {}", month, extra, installment);
            }

            let interest = rounding.interest(opening, monthly_rate);
            let scheduled = if month == terms.term_months || balance <= floor {
                balance.saturating_sub(floor)
            } else {
                installment.saturating_sub(interest).min(balance - floor)
            };
            balance -= scheduled;

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

        let result = schedule.finish(terms, self.method(), initial_installment, prepayments);
        debug!(
            "equal interest: repaid {} in {} months, interest {}",
            result.total_principal, result.effective_term_months, result.total_interest
        );
        Ok(result)
    }
}
