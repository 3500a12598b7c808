//! Inventory report (`/inventory/inventory-report`).

use serde::{Deserialize, Serialize};

use storeadmin_core::ProductId;

/// Predicted demand for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Older backends send the name as `product`.
    #[serde(alias = "product")]
    pub product_name: String,
    pub predicted_demand: f64,
}

impl DemandForecast {
    /// Demand as displayed: two decimals.
    pub fn display_demand(&self) -> String {
        format!("{:.2}", self.predicted_demand)
    }
}

/// One point of the monthly turnover series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverPoint {
    pub month: String,
    pub turnover_rate: f64,
}

/// Single-period turnover figure (cost of goods sold over average inventory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverSummary {
    pub cogs: f64,
    pub average_inventory: f64,
    pub turnover_rate: f64,
}

/// The backend reports turnover either as a series or as one summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InventoryTurnover {
    Monthly(Vec<TurnoverPoint>),
    Summary(TurnoverSummary),
}

impl Default for InventoryTurnover {
    fn default() -> Self {
        InventoryTurnover::Monthly(Vec::new())
    }
}

impl InventoryTurnover {
    /// Chart-ready points. A summary becomes one unlabelled point.
    pub fn points(&self) -> Vec<TurnoverPoint> {
        match self {
            InventoryTurnover::Monthly(points) => points.clone(),
            InventoryTurnover::Summary(summary) => vec![TurnoverPoint {
                month: String::new(),
                turnover_rate: summary.turnover_rate,
            }],
        }
    }
}

/// Best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularProduct {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub total_sold: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    #[serde(default)]
    pub demand_prediction: Vec<DemandForecast>,
    #[serde(default)]
    pub inventory_turnover: InventoryTurnover,
    #[serde(default)]
    pub popular_products: Vec<PopularProduct>,
}
