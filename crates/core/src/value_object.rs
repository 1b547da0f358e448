//! Value objects: equality by value, validated at construction.
//!
//! A value object that exists is a valid one. Parsing is the only way in, so
//! downstream code never re-checks an [`Email`] or a [`Price`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

const MAX_EMAIL_LEN: usize = 254;

/// Normalized e-mail address (trimmed, lower-cased).
///
/// Lower-casing at construction is what makes every lookup case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() || normalized.len() > MAX_EMAIL_LEN {
            return Err(DomainError::validation("invalid email address"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("invalid email address"));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::validation("invalid email address"))?;

        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');

        if local.is_empty() || !domain_ok {
            return Err(DomainError::validation("invalid email address"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Strictly positive price. Currency-agnostic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value <= Decimal::ZERO {
            return Err(DomainError::validation("price must be greater than 0"));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

// Prices travel as JSON numbers.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Price::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use core::str::FromStr;

    #[test]
    fn email_is_normalized() {
        let email = Email::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email, Email::parse("alice@example.com").unwrap());
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "plain", "@example.com", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
            let err = Email::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "accepted {raw:?}");
        }
    }

    #[test]
    fn price_must_be_positive() {
        assert!(Price::new(Decimal::from_str("0.01").unwrap()).is_ok());
        assert_eq!(Price::new(Decimal::ZERO).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(Price::new(Decimal::from(-3)).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn price_serializes_as_number() {
        let price = Price::new(Decimal::from_str("2.5").unwrap()).unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), serde_json::json!(2.5));

        let back: Price = serde_json::from_value(serde_json::json!(2.5)).unwrap();
        assert_eq!(back, price);

        assert!(serde_json::from_value::<Price>(serde_json::json!(0)).is_err());
    }

    #[test]
    fn price_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("3.75").unwrap();
        assert_eq!(price.as_decimal(), Decimal::from_str("3.75").unwrap());

        let err = serde_json::from_str::<Price>("-1").unwrap_err();
        assert!(err.to_string().contains("price must be greater than 0"));
    }
}
