use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storeadmin_core::{DomainError, OrderId};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses an admin may set.
    pub const SETTABLE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::SETTABLE
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "order status must be one of: Pending, Processing, Shipped, Delivered (got '{}')",
                    s.trim()
                ))
            })
    }
}

/// Row of `GET /orders/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "OrderID")]
    pub order_id: OrderId,
    #[serde(rename = "OrderStatus")]
    pub status: OrderStatus,
    #[serde(rename = "TotalAmount", default)]
    pub total_amount: f64,
    #[serde(rename = "OrderDate", default)]
    pub order_date: Option<String>,
    #[serde(rename = "PaymentStatus", default)]
    pub payment_status: Option<String>,
}

/// Header of `GET /orders/{id}`, joined with the customer name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    #[serde(flatten)]
    pub summary: OrderSummary,
    #[serde(rename = "ShippingCost", default)]
    pub shipping_cost: Option<f64>,
    #[serde(rename = "TaxRate", default)]
    pub tax_rate: Option<f64>,
    #[serde(rename = "CustomerName", default)]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

/// Body of `GET /orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: OrderHeader,
    #[serde(default)]
    pub products: Vec<OrderLine>,
}

/// Body of the `update-status` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

impl From<OrderStatus> for StatusUpdate {
    fn from(status: OrderStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

/// File name an invoice download is saved under.
pub fn invoice_file_name(order_id: OrderId) -> String {
    format!("invoice_{order_id}.pdf")
}
