use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{RepayError, Result};

/// money amount; rounding is applied explicitly through a `RoundingPolicy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal without rounding
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d)
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> std::result::Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str_exact(s)?))
    }

    /// create from integer amount (yuan, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents, fen, etc)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, 2))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtract, flooring the result at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

// unrounded; callers normalize through a RoundingPolicy
impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// annual interest rate, stored as a fraction (0.049 for 4.9%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.049 for 4.9%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 4.9 for 4.9%)
    pub fn from_percent(p: Decimal) -> Self {
        Rate(p / Decimal::ONE_HUNDRED)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

/// how midpoints and excess digits are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.005 -> 0.01
    #[default]
    HalfUp,
    /// 0.005 -> 0.00, 0.015 -> 0.02
    HalfEven,
    /// truncate toward zero
    Down,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
        }
    }
}

/// numeric policy shared by every schedule computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// fractional digits of monetary amounts
    pub scale: u32,
    /// fractional digits of derived periodic rates
    pub rate_scale: u32,
    pub mode: RoundingMode,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoundingPolicy {
    /// two places for money, eight for rates, half-up
    pub const fn standard() -> Self {
        Self {
            scale: 2,
            rate_scale: 8,
            mode: RoundingMode::HalfUp,
        }
    }

    /// round a raw value to a monetary amount with exactly `scale` digits
    pub fn money(&self, value: Decimal) -> Money {
        let mut rounded = value.round_dp_with_strategy(self.scale, self.mode.strategy());
        rounded.rescale(self.scale);
        Money(rounded)
    }

    /// normalize an amount that is already money-shaped
    pub fn normalize(&self, amount: Money) -> Money {
        self.money(amount.0)
    }

    /// round a derived rate
    pub fn rate(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.rate_scale, self.mode.strategy())
    }

    /// monthly rate from an annual rate, i.e. annual% / 1200
    pub fn monthly_rate(&self, annual: Rate) -> Decimal {
        self.rate(annual.as_decimal() / Decimal::from(12))
    }

    /// interest on a balance for one period
    pub fn interest(&self, balance: Money, periodic_rate: Decimal) -> Money {
        self.money(balance.0 * periodic_rate)
    }

    /// divide with a guard against zero and overflow
    pub fn divide(&self, numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
        if denominator.is_zero() {
            return Err(RepayError::Arithmetic {
                message: format!("division of {} by zero", numerator),
            });
        }
        numerator
            .checked_div(denominator)
            .ok_or_else(|| RepayError::Arithmetic {
                message: format!("overflow dividing {} by {}", numerator, denominator),
            })
    }

    /// split an amount evenly over a number of periods, rounded to money
    pub fn per_period(&self, amount: Money, periods: u32) -> Result<Money> {
        let share = self.divide(amount.0, Decimal::from(periods))?;
        Ok(self.money(share))
    }
}

/// discount factor (1 + r)^-n; shrinks toward zero instead of overflowing
pub fn discount_factor(periodic_rate: Decimal, periods: u32) -> Result<Decimal> {
    let base = Decimal::ONE
        .checked_div(Decimal::ONE + periodic_rate)
        .ok_or_else(|| RepayError::Arithmetic {
            message: format!("cannot discount at periodic rate {}", periodic_rate),
        })?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        if factor.is_zero() {
            break;
        }
        factor = factor
            .checked_mul(base)
            .ok_or_else(|| RepayError::Arithmetic {
                message: format!("overflow discounting {} over {} periods", periodic_rate, periods),
            })?;
    }
    Ok(factor)
}
