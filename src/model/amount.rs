//! Amount type for handling rupiah values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that may
//! or may not include the `Rp` currency prefix and Indonesian thousands separators (dots).

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

/// Represents an amount of rupiah.
///
/// Values are exact decimals. Rupiah are displayed without fractional digits, so the `Display`
/// implementation rounds half away from zero, e.g. `Rp 1.234.568` for `1234567.5`.
///
/// # Examples
///
/// ```
/// # use event_fund::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1.250.000").unwrap();
/// assert_eq!(amount, Amount::rupiah(1_250_000));
/// assert_eq!(amount.to_string(), "Rp 1.250.000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates a new Amount from a whole number of rupiah.
    pub fn rupiah(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Returns `rate` times this amount, e.g. `Decimal::new(5, 2)` for five percent.
    pub fn percent(&self, rate: Decimal) -> Amount {
        Amount((self.0 * rate).normalize())
    }

    /// The amount rounded to whole rupiah, half away from zero.
    pub fn whole(&self) -> i64 {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or_default()
    }

    /// The amount as a float, used for spreadsheet cells.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Formats the whole-rupiah value with dots as thousands separators and no currency prefix,
    /// e.g. `1.234.567`.
    pub fn grouped(&self) -> String {
        let whole = self.whole();
        let digits = format_num::format_num!(",.0", whole.unsigned_abs() as f64).replace(',', ".");
        if whole < 0 {
            format!("-{digits}")
        } else {
            digits
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts plain numbers (`150000`, `150000.50`) as well as Indonesian formatting
    /// (`Rp 150.000`, `150.000,50`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let rest = rest
            .strip_prefix("Rp")
            .or_else(|| rest.strip_prefix("rp"))
            .unwrap_or(rest)
            .trim_start_matches('.')
            .trim();

        let normalized = if rest.contains(',') {
            // Indonesian decimal comma: dots can only be thousands separators.
            rest.replace('.', "").replace(',', ".")
        } else if is_dot_grouped(rest) {
            rest.replace('.', "")
        } else {
            rest.to_string()
        };

        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

/// True for strings like `1.500` or `12.000.000` where every dot separates a group of three.
fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let first = match groups.next() {
        Some(first) => first,
        None => return false,
    };
    let mut any = false;
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        any = true;
    }
    any && !first.is_empty() && first.len() <= 3 && first.chars().all(|c| c.is_ascii_digit())
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let grouped = self.grouped();
        match grouped.strip_prefix('-') {
            Some(digits) => write!(f, "-Rp {digits}"),
            None => write!(f, "Rp {grouped}"),
        }
    }
}

impl Serialize for Amount {
    /// Serializes as a JSON number so that numeric columns in the remote store accept it.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.fract().is_zero() {
            if let Some(whole) = self.0.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("a number or a string holding a rupiah amount")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::rupiah(v))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        Decimal::from_f64(v)
            .map(|d| Amount(d.normalize()))
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("150000").unwrap();
        assert_eq!(amount, Amount::rupiah(150_000));
    }

    #[test]
    fn test_parse_with_prefix_and_dots() {
        let amount = Amount::from_str("Rp 1.234.567").unwrap();
        assert_eq!(amount, Amount::rupiah(1_234_567));
    }

    #[test]
    fn test_parse_decimal_point() {
        let amount = Amount::from_str("1500.5").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1500.5").unwrap());
    }

    #[test]
    fn test_parse_decimal_comma() {
        let amount = Amount::from_str("1.500,25").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1500.25").unwrap());
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-Rp 2.000").unwrap();
        assert_eq!(amount, Amount::rupiah(-2000));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("lima ribu").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_dot_grouping_detection() {
        assert!(is_dot_grouped("1.500"));
        assert!(is_dot_grouped("12.000.000"));
        assert!(!is_dot_grouped("1500.5"));
        assert!(!is_dot_grouped("1.50"));
        assert!(!is_dot_grouped("1500"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::rupiah(0).to_string(), "Rp 0");
        assert_eq!(Amount::rupiah(999).to_string(), "Rp 999");
        assert_eq!(Amount::rupiah(85_000).to_string(), "Rp 85.000");
        assert_eq!(Amount::rupiah(1_234_567).to_string(), "Rp 1.234.567");
        assert_eq!(Amount::rupiah(-50_000).to_string(), "-Rp 50.000");
    }

    #[test]
    fn test_display_rounds() {
        let amount = Amount::from_str("1234.5").unwrap();
        assert_eq!(amount.to_string(), "Rp 1.235");
    }

    #[test]
    fn test_percent_is_exact() {
        let gross = Amount::rupiah(100_001);
        assert_eq!(
            gross.percent(Decimal::new(5, 2)).value(),
            Decimal::from_str("5000.05").unwrap()
        );
    }

    #[test]
    fn test_serialize_whole_as_integer() {
        let json = serde_json::to_string(&Amount::rupiah(85_000)).unwrap();
        assert_eq!(json, "85000");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("85000").unwrap();
        let b: Amount = serde_json::from_str("85000.0").unwrap();
        let c: Amount = serde_json::from_str("\"Rp 85.000\"").unwrap();
        assert_eq!(a, Amount::rupiah(85_000));
        assert_eq!(b, Amount::rupiah(85_000));
        assert_eq!(c, Amount::rupiah(85_000));
    }

    #[test]
    fn test_sum() {
        let total: Amount = [Amount::rupiah(1), Amount::rupiah(2), Amount::rupiah(3)]
            .iter()
            .sum();
        assert_eq!(total, Amount::rupiah(6));
    }
}
