//! Flat inventory rows and the search/filter/paginate pipeline over them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use storeadmin_core::{ProductId, WarehouseId};

use crate::record::InventorySnapshot;
use crate::status::{StockStatus, StockStatusFilter, Thresholds};

/// One (product, warehouse) pairing: the atomic unit of the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub category_name: String,
    pub warehouse_id: WarehouseId,
    pub stock_quantity: i64,
}

/// Flatten the nested mapping into one row per warehouse entry.
///
/// Order follows the snapshot, then each product's warehouse list.
pub fn flatten(snapshot: &InventorySnapshot) -> Vec<InventoryRow> {
    let mut rows = Vec::with_capacity(snapshot.warehouse_entry_count());
    for (product_id, record) in snapshot.iter() {
        for stock in &record.warehouses {
            rows.push(InventoryRow {
                product_id: product_id.clone(),
                product_name: record.product_name.clone(),
                category_name: record.category_name.clone(),
                warehouse_id: stock.warehouse_id,
                stock_quantity: stock.stock_quantity,
            });
        }
    }
    rows
}

/// Table filter state. `Default` passes every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Case-insensitive substring of the product name; empty matches all.
    pub search_term: String,
    pub warehouse_id: Option<WarehouseId>,
    pub category_name: Option<String>,
    pub stock_status: Option<StockStatusFilter>,
}

impl RowFilter {
    pub fn matches(&self, row: &InventoryRow, thresholds: Thresholds) -> bool {
        self.matches_with_needle(row, &self.search_term.to_lowercase(), thresholds)
    }

    fn matches_with_needle(&self, row: &InventoryRow, needle: &str, thresholds: Thresholds) -> bool {
        let matches_search = needle.is_empty() || row.product_name.to_lowercase().contains(needle);
        let matches_warehouse = self.warehouse_id.is_none_or(|id| row.warehouse_id == id);
        let matches_category = self
            .category_name
            .as_deref()
            .is_none_or(|name| row.category_name == name);
        let matches_status = self
            .stock_status
            .is_none_or(|status| status.matches(thresholds.classify(row.stock_quantity)));

        matches_search && matches_warehouse && matches_category && matches_status
    }
}

/// Stable filter: every predicate ANDed, input order preserved.
pub fn filter(rows: &[InventoryRow], criteria: &RowFilter, thresholds: Thresholds) -> Vec<InventoryRow> {
    let needle = criteria.search_term.to_lowercase();
    rows.iter()
        .filter(|row| criteria.matches_with_needle(row, &needle, thresholds))
        .cloned()
        .collect()
}

/// Zero-indexed page slice, clipped to bounds.
///
/// An out-of-range page (or `rows_per_page == 0`) yields an empty slice; clamping
/// the page index is the caller's job.
pub fn paginate<T>(rows: &[T], page: usize, rows_per_page: usize) -> &[T] {
    if rows_per_page == 0 {
        return &[];
    }
    let Some(start) = page.checked_mul(rows_per_page) else {
        return &[];
    };
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(rows_per_page).min(rows.len());
    &rows[start..end]
}

/// Number of pages needed to show `total` rows.
pub fn page_count(total: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        0
    } else {
        total.div_ceil(rows_per_page)
    }
}

/// Deduplicated, ascending option list built from `selector`.
pub fn distinct_sorted_values<T, K, F>(rows: &[T], selector: F) -> Vec<K>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.iter().map(selector).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Warehouse dropdown options, numerically ascending.
pub fn warehouse_ids(rows: &[InventoryRow]) -> Vec<WarehouseId> {
    distinct_sorted_values(rows, |row| row.warehouse_id)
}

/// Category dropdown options, lexicographically ascending.
pub fn category_names(rows: &[InventoryRow]) -> Vec<String> {
    distinct_sorted_values(rows, |row| row.category_name.clone())
}

/// Rows at or below the critical threshold, in flatten order.
pub fn low_stock_alerts(snapshot: &InventorySnapshot, thresholds: Thresholds) -> Vec<InventoryRow> {
    flatten(snapshot)
        .into_iter()
        .filter(|row| thresholds.classify(row.stock_quantity) == StockStatus::Critical)
        .collect()
}

/// Page position of a table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub rows_per_page: usize,
}

impl Pagination {
    /// Options offered by the inventory table.
    pub const INVENTORY_ROWS_PER_PAGE: [usize; 3] = [10, 20, 30];
    /// Options offered by the demand forecast table.
    pub const FORECAST_ROWS_PER_PAGE: [usize; 3] = [5, 10, 25];

    pub fn new(page: usize, rows_per_page: usize) -> Self {
        Self { page, rows_per_page }
    }

    pub fn inventory_default() -> Self {
        Self::new(0, Self::INVENTORY_ROWS_PER_PAGE[0])
    }

    pub fn forecast_default() -> Self {
        Self::new(0, Self::FORECAST_ROWS_PER_PAGE[0])
    }

    /// Changing the page size returns to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page;
        self.page = 0;
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        paginate(rows, self.page, self.rows_per_page)
    }
}

/// A visible row together with its highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRow {
    pub row: InventoryRow,
    pub status: StockStatus,
}

/// Everything the inventory table renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    pub rows: Vec<ClassifiedRow>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub pagination: Pagination,
    pub page_count: usize,
    pub warehouse_options: Vec<WarehouseId>,
    pub category_options: Vec<String>,
}

impl InventoryView {
    /// flatten → filter → paginate. Dropdown options come from the unfiltered rows.
    pub fn build(
        snapshot: &InventorySnapshot,
        thresholds: Thresholds,
        criteria: &RowFilter,
        pagination: Pagination,
    ) -> Self {
        let all = flatten(snapshot);
        let filtered = filter(&all, criteria, thresholds);
        let rows = pagination
            .slice(&filtered)
            .iter()
            .map(|row| ClassifiedRow {
                status: thresholds.classify(row.stock_quantity),
                row: row.clone(),
            })
            .collect();

        Self {
            rows,
            total_count: all.len(),
            filtered_count: filtered.len(),
            pagination,
            page_count: page_count(filtered.len(), pagination.rows_per_page),
            warehouse_options: warehouse_ids(&all),
            category_options: category_names(&all),
        }
    }
}
