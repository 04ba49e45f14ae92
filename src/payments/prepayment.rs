use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RemainderPolicy;
use crate::decimal::{Money, RoundingPolicy};
use crate::errors::{RepayError, Result};

/// extra one-time principal payment due in a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentEvent {
    /// signed so that out-of-range months are skipped rather than rejected
    pub month: i64,
    pub amount: Decimal,
}

impl PrepaymentEvent {
    pub fn new(month: i64, amount: Decimal) -> Self {
        Self { month, amount }
    }
}

/// prepayment repeated every `cycle_months` between two months inclusive
///
/// fields are optional because requests may omit them; incomplete rules are
/// skipped when the schedule is expanded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringPrepaymentRule {
    #[serde(alias = "startMonth")]
    pub start_month: Option<i64>,
    #[serde(alias = "endMonth")]
    pub end_month: Option<i64>,
    #[serde(alias = "cycleMonths")]
    pub cycle_months: Option<i64>,
    pub amount: Option<Decimal>,
}

struct CheckedRule {
    start: u32,
    end: u32,
    cycle: u32,
    amount: Decimal,
}

impl RecurringPrepaymentRule {
    pub fn new(start_month: i64, end_month: i64, cycle_months: i64, amount: Decimal) -> Self {
        Self {
            start_month: Some(start_month),
            end_month: Some(end_month),
            cycle_months: Some(cycle_months),
            amount: Some(amount),
        }
    }

    fn check(&self, index: usize) -> Result<CheckedRule> {
        let invalid = |reason: &str| RepayError::InvalidPrepaymentRule {
            index,
            reason: reason.to_string(),
        };

        let (start, end, cycle, amount) = match (self.start_month, self.end_month, self.cycle_months, self.amount) {
            (Some(start), Some(end), Some(cycle), Some(amount)) => (start, end, cycle, amount),
            _ => return Err(invalid("missing field")),
        };

        if cycle <= 0 {
            return Err(invalid("cycle must be positive"));
        }
        if start < 1 {
            return Err(invalid("start month must be at least 1"));
        }
        if start > end {
            return Err(invalid("start month after end month"));
        }
        if amount < Decimal::ZERO {
            return Err(invalid("negative amount"));
        }

        let to_month = |value: i64| u32::try_from(value).map_err(|_| invalid("month out of range"));
        Ok(CheckedRule {
            start: to_month(start)?,
            end: to_month(end)?,
            cycle: to_month(cycle)?,
            amount,
        })
    }
}

/// month -> extra principal, owned by exactly one amortization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrepaymentMap(BTreeMap<u32, Money>);

impl PrepaymentMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// add to the amount already due in a month
    pub fn add(&mut self, month: u32, amount: Money) {
        *self.0.entry(month).or_insert(Money::ZERO) += amount;
    }

    pub fn get(&self, month: u32) -> Option<Money> {
        self.0.get(&month).copied()
    }

    /// remove and return the amount due in a month
    pub fn take(&mut self, month: u32) -> Option<Money> {
        self.0.remove(&month)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Money)> + '_ {
        self.0.iter().map(|(month, amount)| (*month, *amount))
    }

    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    /// consume the prepayment due in `month` against `balance` without going
    /// below `floor`; returns the amount actually applied
    pub fn apply_clamped(&mut self, month: u32, balance: Money, floor: Money, policy: RemainderPolicy) -> Money {
        let extra = match self.take(month) {
            Some(extra) => extra,
            None => return Money::ZERO,
        };

        let headroom = balance.saturating_sub(floor);
        if extra <= headroom {
            return extra;
        }

        let remainder = extra - headroom;
        match policy {
            RemainderPolicy::Drop => {
                debug!("month {}: dropping prepayment remainder {} at reserved floor {}", month, remainder, floor);
            }
            RemainderPolicy::Carry => {
                debug!("month {}: carrying prepayment remainder {} to month {}", month, remainder, month.saturating_add(1));
                self.add(month.saturating_add(1), remainder);
            }
        }
        headroom
    }
}

impl FromIterator<(u32, Money)> for PrepaymentMap {
    fn from_iter<I: IntoIterator<Item = (u32, Money)>>(iter: I) -> Self {
        let mut map = PrepaymentMap::new();
        for (month, amount) in iter {
            map.add(month, amount);
        }
        map
    }
}

/// raw prepayment inputs for a loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSchedule {
    pub events: Vec<PrepaymentEvent>,
    pub rules: Vec<RecurringPrepaymentRule>,
}

impl PrepaymentSchedule {
    pub fn new(events: Vec<PrepaymentEvent>, rules: Vec<RecurringPrepaymentRule>) -> Self {
        Self { events, rules }
    }

    pub fn with_event(mut self, month: i64, amount: Decimal) -> Self {
        self.events.push(PrepaymentEvent::new(month, amount));
        self
    }

    pub fn with_rule(mut self, rule: RecurringPrepaymentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// expand events and recurring rules into a single month map covering
    /// months `1..=last_month`
    pub fn expand(&self, rounding: &RoundingPolicy, last_month: u32) -> PrepaymentMap {
        let mut map = PrepaymentMap::new();

        for event in &self.events {
            let amount = rounding.money(event.amount);
            let month = match u32::try_from(event.month) {
                Ok(month) if month >= 1 && !amount.is_negative() => month,
                _ => {
                    let err = RepayError::InvalidPrepayment { month: event.month, amount };
                    warn!("skipping prepayment: {}", err);
                    continue;
                }
            };
            if month > last_month {
                debug!("skipping prepayment at month {} past the last month {}", month, last_month);
                continue;
            }
            map.add(month, amount);
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let rule = match rule.check(index) {
                Ok(rule) => rule,
                Err(err) => {
                    warn!("skipping prepayment rule: {}", err);
                    continue;
                }
            };

            let amount = rounding.money(rule.amount);
            let end = rule.end.min(last_month);
            for month in (rule.start..=end).step_by(rule.cycle as usize) {
                map.add(month, amount);
            }
        }

        debug!("expanded {} prepayment months totalling {}", map.len(), map.total());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn months(map: &PrepaymentMap) -> Vec<(u32, Money)> {
        map.iter().collect()
    }

    #[test]
    fn test_recurring_rule_expansion() {
        let policy = RoundingPolicy::standard();
        let schedule = PrepaymentSchedule::default()
            .with_rule(RecurringPrepaymentRule::new(1, 12, 3, dec!(5000)));

        let map = schedule.expand(&policy, 360);

        assert_eq!(
            months(&map),
            vec![
                (1, Money::from_major(5000)),
                (4, Money::from_major(5000)),
                (7, Money::from_major(5000)),
                (10, Money::from_major(5000)),
            ]
        );
    }

    #[test]
    fn test_rules_and_events_accumulate() {
        let policy = RoundingPolicy::standard();
        let schedule = PrepaymentSchedule::default()
            .with_event(4, dec!(1000))
            .with_event(4, dec!(250.004))
            .with_rule(RecurringPrepaymentRule::new(1, 12, 3, dec!(5000)))
            .with_rule(RecurringPrepaymentRule::new(4, 4, 1, dec!(100)));

        let map = schedule.expand(&policy, 360);

        assert_eq!(map.get(4), Some(Money::from_major(6350)));
        assert_eq!(map.get(1), Some(Money::from_major(5000)));
        assert_eq!(map.get(2), None);
        assert_eq!(map.total(), Money::from_major(21350));
    }

    #[test]
    fn test_end_month_is_inclusive() {
        let policy = RoundingPolicy::standard();
        let map = PrepaymentSchedule::default()
            .with_rule(RecurringPrepaymentRule::new(6, 18, 6, dec!(100)))
            .expand(&policy, 360);

        assert_eq!(map.iter().map(|(m, _)| m).collect::<Vec<_>>(), vec![6, 12, 18]);
    }

    #[test]
    fn test_invalid_rules_are_skipped() {
        let policy = RoundingPolicy::standard();
        let schedule = PrepaymentSchedule::default()
            .with_rule(RecurringPrepaymentRule::new(1, 12, 0, dec!(100)))
            .with_rule(RecurringPrepaymentRule::new(12, 1, 1, dec!(100)))
            .with_rule(RecurringPrepaymentRule::new(0, 12, 1, dec!(100)))
            .with_rule(RecurringPrepaymentRule {
                start_month: Some(1),
                end_month: None,
                cycle_months: Some(1),
                amount: Some(dec!(100)),
            })
            .with_rule(RecurringPrepaymentRule::new(2, 2, 1, dec!(42)))
            .with_event(0, dec!(10))
            .with_event(3, dec!(-10));

        let map = schedule.expand(&policy, 360);

        assert_eq!(months(&map), vec![(2, Money::from_major(42))]);
    }

    #[test]
    fn test_expansion_stops_at_last_month() {
        let policy = RoundingPolicy::standard();
        let map = PrepaymentSchedule::default()
            .with_rule(RecurringPrepaymentRule::new(1, 3_000_000, 1, dec!(1)))
            .with_rule(RecurringPrepaymentRule::new(13, 24, 1, dec!(1)))
            .with_event(12, dec!(50))
            .with_event(13, dec!(50))
            .expand(&policy, 12);

        assert_eq!(map.len(), 12);
        assert!(map.iter().all(|(month, _)| (1..=12).contains(&month)));
        assert_eq!(map.get(12), Some(Money::from_major(51)));
    }

    #[test]
    fn test_negative_event_month_is_skipped() {
        let schedule: PrepaymentSchedule = serde_json::from_str(
            r#"{
                "events": [{ "month": -3, "amount": "100" }, { "month": 2, "amount": "40" }],
                "rules": []
            }"#,
        )
        .unwrap();

        let map = schedule.expand(&RoundingPolicy::standard(), 12);

        assert_eq!(months(&map), vec![(2, Money::from_major(40))]);
    }

    #[test]
    fn test_rule_check_reports_reason() {
        let err = RecurringPrepaymentRule::new(1, 12, -3, dec!(1)).check(7).err().unwrap();

        assert_eq!(
            err,
            RepayError::InvalidPrepaymentRule {
                index: 7,
                reason: "cycle must be positive".to_string(),
            }
        );
    }

    #[test]
    fn test_apply_clamped_in_full() {
        let mut map: PrepaymentMap = vec![(3, Money::from_major(500))].into_iter().collect();

        let applied = map.apply_clamped(3, Money::from_major(10_000), Money::from_major(1000), RemainderPolicy::Drop);

        assert_eq!(applied, Money::from_major(500));
        assert!(map.is_empty());
    }

    #[test]
    fn test_apply_clamped_drops_remainder() {
        let mut map: PrepaymentMap = vec![(3, Money::from_major(5000))].into_iter().collect();

        let applied = map.apply_clamped(3, Money::from_major(3000), Money::from_major(1000), RemainderPolicy::Drop);

        assert_eq!(applied, Money::from_major(2000));
        assert!(map.is_empty());
    }

    #[test]
    fn test_apply_clamped_carries_remainder() {
        let mut map: PrepaymentMap = vec![(3, Money::from_major(5000)), (4, Money::from_major(10))]
            .into_iter()
            .collect();

        let applied = map.apply_clamped(3, Money::from_major(3000), Money::from_major(1000), RemainderPolicy::Carry);

        assert_eq!(applied, Money::from_major(2000));
        assert_eq!(months(&map), vec![(4, Money::from_major(3010))]);
    }

    #[test]
    fn test_apply_without_entry() {
        let mut map = PrepaymentMap::new();

        assert_eq!(map.apply_clamped(1, Money::from_major(100), Money::ZERO, RemainderPolicy::Drop), Money::ZERO);
    }
}
