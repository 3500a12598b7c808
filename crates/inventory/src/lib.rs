//! Inventory view-model builder.
//!
//! Pure transformations from the backend's nested realtime-inventory mapping
//! into flat, classified, filterable and paginated rows (no IO, no HTTP,
//! no caching). Views rebuild from the latest snapshot on every render.

pub mod record;
pub mod report;
pub mod status;
pub mod view;

pub use record::{InventoryRecord, InventorySnapshot, WarehouseStock};
pub use report::{DemandForecast, InventoryReport, InventoryTurnover, PopularProduct, TurnoverPoint, TurnoverSummary};
pub use status::{StockStatus, StockStatusFilter, Thresholds, classify};
pub use view::{
    ClassifiedRow, InventoryRow, InventoryView, Pagination, RowFilter, category_names,
    distinct_sorted_values, filter, flatten, low_stock_alerts, page_count, paginate, warehouse_ids,
};
