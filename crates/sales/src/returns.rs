use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use storeadmin_core::{DomainError, DomainResult, OrderId, ReturnId};

use crate::order::StatusUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
    #[serde(other)]
    Unknown,
}

impl ReturnStatus {
    pub const SETTABLE: [ReturnStatus; 4] = [
        ReturnStatus::Pending,
        ReturnStatus::Approved,
        ReturnStatus::Rejected,
        ReturnStatus::Processed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "Pending",
            ReturnStatus::Approved => "Approved",
            ReturnStatus::Rejected => "Rejected",
            ReturnStatus::Processed => "Processed",
            ReturnStatus::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReturnStatus::SETTABLE
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "return status must be one of: Pending, Approved, Rejected, Processed (got '{}')",
                    s.trim()
                ))
            })
    }
}

impl From<ReturnStatus> for StatusUpdate {
    fn from(status: ReturnStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

/// What an admin can do with an approved return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnAction {
    Refund,
    Replace,
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

/// Row of `GET /orders/returns` and body of `GET /orders/returns/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    #[serde(rename = "ReturnID")]
    pub return_id: ReturnId,
    #[serde(rename = "OrderID")]
    pub order_id: OrderId,
    #[serde(rename = "Reason", default)]
    pub reason: Option<String>,
    #[serde(rename = "ReturnDate", default)]
    pub return_date: Option<String>,
    #[serde(rename = "ReturnStatus")]
    pub status: ReturnStatus,
    #[serde(rename = "RAction", default)]
    pub requested_action: Option<String>,
    #[serde(rename = "ReplacementOffered", default, deserialize_with = "flag")]
    pub replacement_offered: bool,
}

impl ReturnRequest {
    /// Refunds and replacements are only issued for approved returns, and a
    /// replacement only once.
    pub fn ensure_actionable(&self, action: ReturnAction) -> DomainResult<()> {
        if self.status != ReturnStatus::Approved {
            return Err(DomainError::invariant(format!(
                "Return request {} is not approved",
                self.return_id
            )));
        }
        if action == ReturnAction::Replace && self.replacement_offered {
            return Err(DomainError::invariant(
                "Replacement has already been offered for this return",
            ));
        }
        Ok(())
    }
}

/// Row of `GET /orders/refunds`: a return joined with its payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    #[serde(rename = "ReturnID")]
    pub return_id: ReturnId,
    #[serde(rename = "OrderID")]
    pub order_id: OrderId,
    #[serde(rename = "Reason", default)]
    pub reason: Option<String>,
    #[serde(rename = "ReturnDate", default)]
    pub return_date: Option<String>,
    #[serde(rename = "ReturnStatus")]
    pub return_status: ReturnStatus,
    #[serde(rename = "RAction", default)]
    pub requested_action: Option<String>,
    #[serde(rename = "PaymentStatus", default)]
    pub payment_status: Option<String>,
    #[serde(rename = "RefundAmount", default)]
    pub refund_amount: Option<f64>,
    #[serde(rename = "RefundDate", default)]
    pub refund_date: Option<String>,
}
