use std::{
    fmt,
    ops::{Add, Neg, Sub},
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (balances, ledger
/// totals, transaction amounts) so every arithmetic step stays on a 2-place
/// fixed-point grid.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
/// use rust_decimal::Decimal;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
///
/// // Decimal input is rounded to cents.
/// let parsed = MoneyCents::try_from(Decimal::new(10_005, 3)).unwrap();
/// assert_eq!(parsed.cents(), 1001);
/// ```
///
/// Serializes as the bare number of cents.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the amount as a `Decimal` with exactly 2 fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parses a user supplied amount that must be strictly positive.
    ///
    /// `label` names the parameter in the error message.
    pub fn positive(value: Decimal, label: &str) -> Result<Self, EngineError> {
        let amount = Self::try_from(value)?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidArgument(format!(
                "{label} must be > 0"
            )));
        }
        Ok(amount)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl TryFrom<Decimal> for MoneyCents {
    type Error = EngineError;

    /// Rounds to 2 fractional digits (midpoint away from zero) and converts to
    /// cents.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let cents = rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.to_i64())
            .ok_or_else(|| EngineError::InvalidArgument("amount too large".to_string()))?;
        Ok(Self(cents))
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_formats_two_places() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn decimal_is_rounded_to_cents() {
        assert_eq!(MoneyCents::try_from(dec!(10)).unwrap().cents(), 1000);
        assert_eq!(MoneyCents::try_from(dec!(10.5)).unwrap().cents(), 1050);
        assert_eq!(MoneyCents::try_from(dec!(0.005)).unwrap().cents(), 1);
        assert_eq!(MoneyCents::try_from(dec!(12.344)).unwrap().cents(), 1234);
        assert_eq!(MoneyCents::try_from(dec!(-0.015)).unwrap().cents(), -2);
    }

    #[test]
    fn decimal_round_trip_keeps_scale() {
        let amount = MoneyCents::try_from(dec!(100)).unwrap();
        assert_eq!(amount.to_decimal().to_string(), "100.00");
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(MoneyCents::positive(dec!(0), "amount").is_err());
        assert!(MoneyCents::positive(dec!(-1), "amount").is_err());
        // Rounds to zero cents.
        assert!(MoneyCents::positive(dec!(0.004), "amount").is_err());
        assert_eq!(
            MoneyCents::positive(dec!(0.01), "amount").unwrap(),
            MoneyCents::new(1)
        );
    }

    #[test]
    fn serializes_as_cents() {
        assert_eq!(serde_json::to_string(&MoneyCents::new(-1050)).unwrap(), "-1050");
        let parsed: MoneyCents = serde_json::from_str("60000").unwrap();
        assert_eq!(parsed, MoneyCents::new(60_000));
    }

    #[test]
    fn overflow_is_rejected() {
        let huge = Decimal::MAX;
        assert_eq!(
            MoneyCents::try_from(huge),
            Err(EngineError::InvalidArgument("amount too large".to_string()))
        );
    }
}
