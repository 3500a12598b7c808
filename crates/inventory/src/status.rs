//! Stock-level classification.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storeadmin_core::{DomainError, DomainResult};

/// Severity of a warehouse's quantity on hand.
///
/// Ordered most severe first: `Critical < Low < Normal`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Low,
    Normal,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::Low => "Low",
            StockStatus::Normal => "Normal",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a quantity against the two thresholds.
///
/// Boundaries are inclusive and `critical` is checked first, so a quantity equal
/// to `critical` is `Critical` and one equal to `low` is `Low`.
pub fn classify(stock_quantity: i64, critical: i64, low: i64) -> StockStatus {
    if stock_quantity <= critical {
        StockStatus::Critical
    } else if stock_quantity <= low {
        StockStatus::Low
    } else {
        StockStatus::Normal
    }
}

/// The pair of thresholds a view classifies against. Always `critical <= low`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    critical: i64,
    low: i64,
}

impl Thresholds {
    pub const DEFAULT_CRITICAL: i64 = 10;
    pub const DEFAULT_LOW: i64 = 20;

    pub fn new(critical: i64, low: i64) -> DomainResult<Self> {
        if critical > low {
            return Err(DomainError::validation(format!(
                "critical threshold ({critical}) must not exceed low threshold ({low})"
            )));
        }
        Ok(Self { critical, low })
    }

    pub fn critical(&self) -> i64 {
        self.critical
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn classify(&self, stock_quantity: i64) -> StockStatus {
        classify(stock_quantity, self.critical, self.low)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical: Self::DEFAULT_CRITICAL,
            low: Self::DEFAULT_LOW,
        }
    }
}

/// Stock-status filter choice.
///
/// The buckets are mutually exclusive: `Low` selects rows classified `Low` only,
/// so critical rows never show under the low filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatusFilter {
    Low,
    Critical,
}

impl StockStatusFilter {
    pub fn matches(&self, status: StockStatus) -> bool {
        match self {
            StockStatusFilter::Low => status == StockStatus::Low,
            StockStatusFilter::Critical => status == StockStatus::Critical,
        }
    }

    /// Parse the dropdown value; the empty string means "no filter".
    pub fn parse_optional(value: &str) -> DomainResult<Option<Self>> {
        if value.trim().is_empty() {
            Ok(None)
        } else {
            value.parse().map(Some)
        }
    }
}

impl FromStr for StockStatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "critical" => Ok(Self::Critical),
            other => Err(DomainError::validation(format!(
                "stock status must be one of: low, critical (got '{other}')"
            ))),
        }
    }
}
