//! Terminal rendering of dashboard views.

use comfy_table::{CellAlignment, Table};

use storeadmin_auth::Dashboard;
use storeadmin_inventory::{DemandForecast, InventoryRow, InventoryTurnover, InventoryView, Pagination, PopularProduct};
use storeadmin_products::{Category, Product};
use storeadmin_sales::{OrderDetails, OrderSummary, RefundRecord, ReturnRequest};

pub const NO_LOW_STOCK: &str = "No low stock items.";

fn table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_FULL_CONDENSED)
        .set_header(header);
    table
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for &col in columns {
        if let Some(column) = table.column_mut(col) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

/// `11-20 of 23`, the way a paginated table labels its rows.
pub fn page_footer(pagination: Pagination, total: usize) -> String {
    let start = pagination.page.saturating_mul(pagination.rows_per_page);
    if total == 0 || start >= total {
        return format!("0 of {total}");
    }
    let end = start.saturating_add(pagination.rows_per_page).min(total);
    format!("{}-{end} of {total}", start + 1)
}

pub fn inventory(view: &InventoryView) -> String {
    let mut t = table(["Product ID", "Product Name", "Category", "Warehouse ID", "Stock Quantity", "Status"]);
    for classified in &view.rows {
        let row = &classified.row;
        t.add_row([
            row.product_id.to_string(),
            row.product_name.clone(),
            row.category_name.clone(),
            row.warehouse_id.to_string(),
            row.stock_quantity.to_string(),
            classified.status.to_string(),
        ]);
    }
    align_right(&mut t, &[3, 4]);

    format!(
        "{t}\n{} (page {} of {}, {} rows in total)",
        page_footer(view.pagination, view.filtered_count),
        view.pagination.page + 1,
        view.page_count.max(1),
        view.total_count,
    )
}

pub fn alerts(rows: &[InventoryRow]) -> String {
    if rows.is_empty() {
        return format!("Low Stock Alerts\n  {NO_LOW_STOCK}");
    }
    let mut out = String::from("Low Stock Alerts");
    for row in rows {
        out.push_str(&format!(
            "\n  {} (Warehouse {}): Stock Quantity: {}",
            row.product_name, row.warehouse_id, row.stock_quantity
        ));
    }
    out
}

pub fn demand_forecast(forecasts: &[DemandForecast], pagination: Pagination) -> String {
    let mut t = table(["Product ID", "Product Name", "Predicted Demand"]);
    for forecast in pagination.slice(forecasts) {
        t.add_row([
            forecast.product_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            forecast.product_name.clone(),
            forecast.display_demand(),
        ]);
    }
    align_right(&mut t, &[2]);
    format!("{t}\n{}", page_footer(pagination, forecasts.len()))
}

pub fn turnover(turnover: &InventoryTurnover) -> String {
    match turnover {
        InventoryTurnover::Summary(summary) => {
            let mut t = table(["COGS", "Average Inventory", "Turnover Rate"]);
            t.add_row([
                money(summary.cogs),
                money(summary.average_inventory),
                format!("{:.2}", summary.turnover_rate),
            ]);
            align_right(&mut t, &[0, 1, 2]);
            t.to_string()
        }
        InventoryTurnover::Monthly(_) => {
            let mut t = table(["Month", "Turnover Rate"]);
            for point in turnover.points() {
                t.add_row([point.month.clone(), format!("{:.2}", point.turnover_rate)]);
            }
            align_right(&mut t, &[1]);
            t.to_string()
        }
    }
}

pub fn popular_products(products: &[PopularProduct]) -> String {
    let mut t = table(["Product ID", "Product Name", "Total Sold"]);
    for product in products {
        t.add_row([
            product.product_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            product.name.clone(),
            product.total_sold.to_string(),
        ]);
    }
    align_right(&mut t, &[2]);
    t.to_string()
}

pub fn navigation(items: &[Dashboard]) -> String {
    let mut t = table(["Dashboard", "Path"]);
    for item in items {
        t.add_row([item.label(), item.path()]);
    }
    t.to_string()
}

pub fn products(products: &[Product]) -> String {
    let mut t = table(["Product ID", "Name", "Price", "Stock", "Category", "Featured"]);
    for p in products {
        t.add_row([
            p.product_id.to_string(),
            p.name.clone(),
            money(p.price),
            p.stock_quantity.to_string(),
            p.category_id.map(|id| id.to_string()).unwrap_or_default(),
            if p.featured { "yes" } else { "" }.to_string(),
        ]);
    }
    align_right(&mut t, &[2, 3]);
    t.to_string()
}

pub fn product(p: &Product) -> String {
    let mut t = table(["Field", "Value"]);
    t.add_row(["Product ID".to_string(), p.product_id.to_string()])
        .add_row(["Name".to_string(), p.name.clone()])
        .add_row(["Description".to_string(), or_dash(p.description.as_deref())])
        .add_row(["Price".to_string(), money(p.price)])
        .add_row(["Size".to_string(), or_dash(p.size.as_deref())])
        .add_row(["Color".to_string(), or_dash(p.color.as_deref())])
        .add_row(["Material".to_string(), or_dash(p.material.as_deref())])
        .add_row(["Stock Quantity".to_string(), p.stock_quantity.to_string()])
        .add_row(["Featured".to_string(), p.featured.to_string()]);
    t.to_string()
}

pub fn categories(categories: &[Category]) -> String {
    let mut t = table(["Category ID", "Name"]);
    for c in categories {
        t.add_row([c.category_id.to_string(), c.name.clone()]);
    }
    t.to_string()
}

pub fn orders(orders: &[OrderSummary]) -> String {
    let mut t = table(["Order ID", "Order Date", "Status", "Total Amount", "Payment"]);
    for o in orders {
        t.add_row([
            o.order_id.to_string(),
            or_dash(o.order_date.as_deref()),
            o.status.to_string(),
            money(o.total_amount),
            or_dash(o.payment_status.as_deref()),
        ]);
    }
    align_right(&mut t, &[3]);
    t.to_string()
}

pub fn order_details(details: &OrderDetails) -> String {
    let order = &details.order;
    let mut header = table(["Field", "Value"]);
    header
        .add_row(["Order ID".to_string(), order.summary.order_id.to_string()])
        .add_row(["Customer".to_string(), or_dash(order.customer_name.as_deref())])
        .add_row(["Order Date".to_string(), or_dash(order.summary.order_date.as_deref())])
        .add_row(["Status".to_string(), order.summary.status.to_string()])
        .add_row(["Payment".to_string(), or_dash(order.summary.payment_status.as_deref())])
        .add_row(["Total Amount".to_string(), money(order.summary.total_amount)])
        .add_row([
            "Shipping Cost".to_string(),
            order.shipping_cost.map(money).unwrap_or_else(|| "-".to_string()),
        ])
        .add_row([
            "Tax Rate".to_string(),
            order.tax_rate.map(|r| format!("{r}")).unwrap_or_else(|| "-".to_string()),
        ]);

    let mut lines = table(["Product", "Quantity"]);
    for line in &details.products {
        lines.add_row([line.product_name.clone(), line.quantity.to_string()]);
    }
    align_right(&mut lines, &[1]);

    format!("{header}\n{lines}")
}

pub fn returns(returns: &[ReturnRequest]) -> String {
    let mut t = table(["Return ID", "Order ID", "Reason", "Return Date", "Status", "Action", "Replacement"]);
    for r in returns {
        t.add_row([
            r.return_id.to_string(),
            r.order_id.to_string(),
            or_dash(r.reason.as_deref()),
            or_dash(r.return_date.as_deref()),
            r.status.to_string(),
            or_dash(r.requested_action.as_deref()),
            if r.replacement_offered { "offered" } else { "" }.to_string(),
        ]);
    }
    t.to_string()
}

pub fn refunds(refunds: &[RefundRecord]) -> String {
    let mut t = table(["Return ID", "Order ID", "Reason", "Status", "Payment", "Refund Amount", "Refund Date"]);
    for r in refunds {
        t.add_row([
            r.return_id.to_string(),
            r.order_id.to_string(),
            or_dash(r.reason.as_deref()),
            r.return_status.to_string(),
            or_dash(r.payment_status.as_deref()),
            r.refund_amount.map(money).unwrap_or_else(|| "-".to_string()),
            or_dash(r.refund_date.as_deref()),
        ]);
    }
    align_right(&mut t, &[5]);
    t.to_string()
}
