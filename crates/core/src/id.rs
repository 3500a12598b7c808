//! Strongly-typed identifiers used across the admin client.
//!
//! The backend is not consistent about identifier encoding: most ids arrive as
//! JSON numbers, while the realtime inventory keys products by string. Every
//! identifier therefore deserializes from either form.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(i64),
    Str(String),
}

/// Identifier of a warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WarehouseId(i64);

/// Identifier of an administrator account (the `user_id` returned by login).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AdminId(i64);

/// Identifier of a customer order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(i64);

/// Identifier of a return request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReturnId(i64);

/// Identifier of a product category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

macro_rules! impl_int_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match NumOrStr::deserialize(deserializer)? {
                    NumOrStr::Num(n) => Ok(Self(n)),
                    NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

impl_int_newtype!(WarehouseId, "WarehouseId");
impl_int_newtype!(AdminId, "AdminId");
impl_int_newtype!(OrderId, "OrderId");
impl_int_newtype!(ReturnId, "ReturnId");
impl_int_newtype!(CategoryId, "CategoryId");

/// Identifier of a product.
///
/// Kept as text: it is a JSON object key in the realtime inventory and only
/// ever used opaquely (displayed, or spliced into a URL path).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can stand as one URL path segment as-is.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\', '?', '#', '%'])
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ProductId: empty"));
        }
        let id = Self(trimmed.to_string());
        if !id.is_path_safe() {
            return Err(DomainError::invalid_id(format!("ProductId: '{trimmed}' is not a single path segment")));
        }
        Ok(id)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(n) => Ok(Self(n.to_string())),
            NumOrStr::Str(s) => Ok(Self(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_accept_numbers_and_numeric_strings() {
        let a: OrderId = serde_json::from_str("42").unwrap();
        let b: OrderId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(), 42);
    }

    #[test]
    fn integer_ids_reject_non_numeric_strings() {
        let err = serde_json::from_str::<WarehouseId>("\"north\"").unwrap_err();
        assert!(err.to_string().contains("WarehouseId"));
    }

    #[test]
    fn product_id_from_number_matches_string_key() {
        let from_num: ProductId = serde_json::from_str("7").unwrap();
        let from_str: ProductId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_num, from_str);
        assert_eq!(from_num.to_string(), "7");
    }

    #[test]
    fn empty_product_id_is_invalid() {
        match "  ".parse::<ProductId>() {
            Err(DomainError::InvalidId(_)) => {}
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn product_ids_that_would_change_the_url_path_are_rejected() {
        for raw in ["../orders/1", "a/b", "..", ".", "P1?x=1", "P%2F1"] {
            assert!(raw.parse::<ProductId>().is_err(), "{raw} accepted");
        }
        assert!(!ProductId::from("../orders/1").is_path_safe());
        assert_eq!("SKU-1.2".parse::<ProductId>().unwrap(), ProductId::from("SKU-1.2"));
    }
}
