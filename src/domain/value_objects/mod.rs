//! Value Objects for the storefront

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Money value object.
///
/// Amounts are persisted as integer minor units (cents); in memory they are
/// carried as a two-decimal [`Decimal`] tagged with an ISO currency code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_uppercase() } }
    pub fn from_minor(minor: i64, currency: &str) -> Self { Self::new(Decimal::new(minor, 2), currency) }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }

    /// Amount in minor units, truncating anything below a cent.
    pub fn minor_units(&self) -> i64 {
        (self.amount * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or(i64::MAX)
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch { left: self.currency.clone(), right: other.currency.clone() });
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.round_dp(2), self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    pub fn subtract(&self, other: u32) -> Option<Self> {
        if other > self.0 { None } else { Some(Self(self.0 - other)) }
    }
    pub fn is_zero(&self) -> bool { self.0 == 0 }

    /// Converts a stored integer column, clamping negatives to zero.
    pub fn from_column(value: i64) -> Self { Self(u32::try_from(value.max(0)).unwrap_or(u32::MAX)) }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone pattern compiles"))
}

fn phone_separators() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s\-()]").expect("separator pattern compiles"))
}

/// Customer phone number, normalised to E.164-like `+<digits>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let cleaned = phone_separators().replace_all(raw.trim(), "");
        if !phone_pattern().is_match(&cleaned) {
            return Err(PhoneError::Invalid(raw.trim().to_string()));
        }
        let normalised = if cleaned.starts_with('+') { cleaned.into_owned() } else { format!("+{cleaned}") };
        Ok(Self(normalised))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("invalid phone number: {0:?}")]
    Invalid(String),
}

/// Delivery location as shared from the chat client.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates { latitude: f64, longitude: f64 }

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::OutOfRange { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
    pub fn latitude(&self) -> f64 { self.latitude }
    pub fn longitude(&self) -> f64 { self.longitude }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_minor_units() {
        let m = Money::from_minor(129_999, "usd");
        assert_eq!(m.amount(), Decimal::new(129_999, 2));
        assert_eq!(m.currency(), "USD");
        assert_eq!(m.minor_units(), 129_999);
    }

    #[test]
    fn test_money_add() {
        let a = Money::from_minor(10_000, "USD");
        let b = Money::from_minor(5_050, "USD");
        assert_eq!(a.add(&b).unwrap().minor_units(), 15_050);
        assert!(a.add(&Money::zero("EUR")).is_err());
    }

    #[test]
    fn test_money_multiply() {
        assert_eq!(Money::from_minor(1_999, "USD").multiply(3).minor_units(), 5_997);
    }

    #[test]
    fn test_quantity() {
        let q = Quantity::new(3);
        assert_eq!(q.subtract(4), None);
        assert_eq!(q.subtract(3).unwrap(), Quantity::default());
        assert_eq!(Quantity::from_column(-5).value(), 0);
    }

    #[test]
    fn test_phone_normalisation() {
        assert_eq!(PhoneNumber::parse("+1 (234) 567-890").unwrap().as_str(), "+1234567890");
        assert_eq!(PhoneNumber::parse("998901234567").unwrap().as_str(), "+998901234567");
    }

    #[test]
    fn test_phone_rejects_garbage() {
        assert!(PhoneNumber::parse("hello").is_err());
        assert!(PhoneNumber::parse("+0123456789").is_err());
        assert!(PhoneNumber::parse("12345").is_err());
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(41.31, 69.24).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
    }
}
