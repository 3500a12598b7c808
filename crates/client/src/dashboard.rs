//! State behind the inventory dashboard: the latest poll results.
//!
//! Views are rebuilt from the latest snapshot on every call; nothing derived
//! is kept between polls.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use storeadmin_inventory::{
    InventoryReport, InventoryRow, InventorySnapshot, InventoryView, Pagination, RowFilter, Thresholds,
    low_stock_alerts,
};

use crate::poll::SequencedSlot;

#[derive(Debug)]
pub struct DashboardState {
    thresholds: Thresholds,
    inventory: Arc<SequencedSlot<InventorySnapshot>>,
    report: Arc<SequencedSlot<InventoryReport>>,
}

impl DashboardState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            inventory: Arc::new(SequencedSlot::new()),
            report: Arc::new(SequencedSlot::new()),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn inventory_slot(&self) -> &Arc<SequencedSlot<InventorySnapshot>> {
        &self.inventory
    }

    pub fn report_slot(&self) -> &Arc<SequencedSlot<InventoryReport>> {
        &self.report
    }

    pub fn snapshot(&self) -> Option<InventorySnapshot> {
        self.inventory.value()
    }

    pub fn report(&self) -> Option<InventoryReport> {
        self.report.value()
    }

    pub fn inventory_error(&self) -> Option<String> {
        self.inventory.error()
    }

    pub fn report_error(&self) -> Option<String> {
        self.report.error()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inventory.updated_at()
    }

    /// Table for the given filter and page. Empty until the first successful poll.
    pub fn inventory_view(&self, filter: &RowFilter, page: usize, rows_per_page: usize) -> InventoryView {
        let snapshot = self.snapshot().unwrap_or_default();
        InventoryView::build(&snapshot, self.thresholds, filter, Pagination::new(page, rows_per_page))
    }

    /// Critical rows for the notification list.
    pub fn alerts(&self) -> Vec<InventoryRow> {
        self.snapshot()
            .map(|snapshot| low_stock_alerts(&snapshot, self.thresholds))
            .unwrap_or_default()
    }
}
