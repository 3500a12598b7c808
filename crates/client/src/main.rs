//! `storeadmin`: the store admin panel in a terminal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;

use storeadmin_auth::{AuthError, Credentials, Session, SessionStore, landing_route, visible_navigation};
use storeadmin_client::{
    ApiClient, ApiMessage, ClientConfig, ClientError, DashboardState, InventoryPoller, Resolution, Route, render, resolve,
};
use storeadmin_core::{AdminId, CategoryId, OrderId, ProductId, ReturnId, WarehouseId};
use storeadmin_inventory::{Pagination, RowFilter, StockStatusFilter};
use storeadmin_observability::LogFormat;
use storeadmin_products::{ProductDraft, WarehouseStockEntry, parse_price, parse_quantity};
use storeadmin_sales::{OrderStatus, ReturnStatus, invoice_file_name};

#[derive(Debug, clap::Parser)]
#[clap(about, version, name = "storeadmin")]
struct Cli {
    /// Base URL of the store backend.
    #[clap(long, env = "STOREADMIN_API_URL")]
    api_url: Option<String>,

    /// Bearer token printed by `storeadmin login`.
    #[clap(long, env = "STOREADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[clap(long, env = "STOREADMIN_ADMIN_ID")]
    admin_id: Option<AdminId>,

    /// Log line format on stderr: json or compact.
    #[clap(long, env = "STOREADMIN_LOG_FORMAT", default_value = "compact")]
    log_format: LogFormat,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Log in and print the session for the environment.
    Login {
        #[clap(long)]
        email: String,
        #[clap(long, env = "STOREADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Dashboards the logged-in admin may open.
    Nav,
    /// Realtime inventory with stock status and low stock alerts.
    Inventory {
        /// Case-insensitive product name search.
        #[clap(long, default_value = "")]
        search: String,
        #[clap(long)]
        warehouse: Option<WarehouseId>,
        #[clap(long)]
        category: Option<String>,
        /// low or critical.
        #[clap(long)]
        status: Option<StockStatusFilter>,
        /// 1-based page number.
        #[clap(long, default_value_t = 1)]
        page: usize,
        #[clap(long)]
        rows_per_page: Option<usize>,
        /// Also show demand forecast, turnover and popular products.
        #[clap(long)]
        report: bool,
        /// Keep polling and redrawing until Ctrl-C.
        #[clap(long)]
        watch: bool,
    },
    Products,
    Product {
        id: ProductId,
    },
    Categories,
    AddProduct {
        #[clap(flatten)]
        fields: ProductFields,
        /// Initial stock per warehouse as `warehouse_id:quantity`; repeatable.
        #[clap(long = "warehouse-stock", value_parser = parse_warehouse_stock)]
        warehouse_stock: Vec<WarehouseStockEntry>,
    },
    /// Change fields of an existing product; unset fields keep their value.
    UpdateProduct {
        id: ProductId,
        #[clap(flatten)]
        fields: ProductFields,
    },
    DeleteProduct {
        id: ProductId,
    },
    /// Upload a CSV of products.
    BulkUpload {
        file: PathBuf,
    },
    UploadImage {
        id: ProductId,
        file: PathBuf,
    },
    Orders,
    Order {
        id: OrderId,
    },
    SetOrderStatus {
        id: OrderId,
        status: OrderStatus,
    },
    /// Download an order's invoice as `invoice_<id>.pdf`.
    Invoice {
        id: OrderId,
        #[clap(long, default_value = ".")]
        output_dir: PathBuf,
    },
    Returns,
    Return {
        id: ReturnId,
    },
    SetReturnStatus {
        id: ReturnId,
        status: ReturnStatus,
    },
    Refunds,
    /// Issue a refund for an approved return.
    Refund {
        id: ReturnId,
    },
    /// Offer a replacement for an approved return.
    Replace {
        id: ReturnId,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct ProductFields {
    #[clap(long)]
    name: Option<String>,
    #[clap(long)]
    description: Option<String>,
    #[clap(long, value_parser = parse_price)]
    price: Option<f64>,
    #[clap(long, value_parser = parse_quantity)]
    stock: Option<i64>,
    #[clap(long)]
    size: Option<String>,
    #[clap(long)]
    color: Option<String>,
    #[clap(long)]
    material: Option<String>,
    #[clap(long)]
    category: Option<CategoryId>,
    #[clap(long)]
    subcategory: Option<CategoryId>,
    #[clap(long)]
    featured: Option<bool>,
}

impl ProductFields {
    fn apply(self, draft: ProductDraft) -> ProductDraft {
        ProductDraft {
            name: self.name.unwrap_or(draft.name),
            description: self.description.unwrap_or(draft.description),
            price: self.price.unwrap_or(draft.price),
            stock_quantity: self.stock.unwrap_or(draft.stock_quantity),
            size: self.size.or(draft.size),
            color: self.color.or(draft.color),
            material: self.material.or(draft.material),
            category_id: self.category.or(draft.category_id),
            subcategory_id: self.subcategory.or(draft.subcategory_id),
            featured: self.featured.unwrap_or(draft.featured),
            warehouse_stock: draft.warehouse_stock,
        }
    }

    fn into_draft(self, warehouse_stock: Vec<WarehouseStockEntry>) -> ProductDraft {
        let empty = ProductDraft {
            name: String::new(),
            description: String::new(),
            price: 0.0,
            size: None,
            color: None,
            material: None,
            stock_quantity: 0,
            category_id: None,
            subcategory_id: None,
            featured: false,
            warehouse_stock,
        };
        self.apply(empty)
    }
}

impl Command {
    /// The panel page a command stands for, checked against the login guard
    /// before anything is sent. `nav` belongs to no single page.
    fn screen(&self) -> Option<Route> {
        let route = match self {
            Command::Login { .. } => Route::Login,
            Command::Nav => return None,
            Command::Inventory { .. } => Route::InventoryDashboard,
            Command::Products => Route::Products,
            Command::Product { id } | Command::UpdateProduct { id, .. } | Command::UploadImage { id, .. } => {
                Route::Product(id.clone())
            }
            Command::Categories | Command::AddProduct { .. } | Command::DeleteProduct { .. } | Command::BulkUpload { .. } => {
                Route::ProductDashboard
            }
            Command::Orders => Route::AllOrders,
            Command::Order { id } | Command::SetOrderStatus { id, .. } | Command::Invoice { id, .. } => Route::Order(*id),
            Command::Returns => Route::Returns,
            Command::Return { id } | Command::SetReturnStatus { id, .. } | Command::Refund { id } | Command::Replace { id } => {
                Route::Return(*id)
            }
            Command::Refunds => Route::Refunds,
        };
        Some(route)
    }
}

fn parse_warehouse_stock(raw: &str) -> Result<WarehouseStockEntry, String> {
    let (warehouse, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected warehouse_id:quantity, got '{raw}'"))?;
    Ok(WarehouseStockEntry {
        warehouse_id: warehouse.trim().parse::<WarehouseId>().map_err(|e| format!("{e}"))?,
        quantity: parse_quantity(quantity).map_err(|e| e.to_string())?,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    storeadmin_observability::init(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(err) if err.is_unauthenticated() => {
                    eprintln!("{}", err.error_message());
                    eprintln!("Run `storeadmin login` and export the printed session.");
                }
                Some(err) => {
                    tracing::debug!(error = %err, "command failed");
                    eprintln!("{}", err.error_message());
                }
                None => eprintln!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("reading STOREADMIN_* configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    let session = match (cli.token, cli.admin_id) {
        (Some(token), Some(admin_id)) => SessionStore::with_session(Session::new(token, admin_id, Utc::now())),
        (Some(_), None) => bail!("STOREADMIN_ADMIN_ID is required together with STOREADMIN_TOKEN"),
        (None, _) => SessionStore::new(),
    };
    let client = ApiClient::new(config.api_url.clone(), Arc::new(session), config.request_timeout)?;
    tracing::debug!(api_url = client.base_url(), "client ready");

    if let Some(screen) = cli.command.screen() {
        match resolve(&screen.path(), client.session()) {
            Resolution::Render(_) => {}
            Resolution::Redirect(to) => {
                tracing::debug!(from = %screen.path(), to, "no session");
                return Err(ClientError::Unauthenticated.into());
            }
            Resolution::NotFound => bail!("no page at {}", screen.path()),
        }
    }

    match cli.command {
        Command::Login { email, password } => login(&client, Credentials { email, password }).await?,
        Command::Nav => {
            let roles = client.admin_roles().await?;
            let items = visible_navigation(&roles);
            if items.is_empty() {
                println!("{}", AuthError::NoAccessibleDashboard);
            } else {
                println!("{}", render::navigation(&items));
            }
        }
        Command::Inventory {
            search,
            warehouse,
            category,
            status,
            page,
            rows_per_page,
            report,
            watch,
        } => {
            let filter = RowFilter {
                search_term: search,
                warehouse_id: warehouse,
                category_name: category,
                stock_status: status,
            };
            let pagination = Pagination::new(page.saturating_sub(1), rows_per_page.unwrap_or(config.rows_per_page));
            let state = Arc::new(DashboardState::new(config.thresholds));
            if watch {
                watch_inventory(client, &config, state, &filter, pagination, report).await?;
            } else {
                inventory_once(&client, &state, &filter, pagination, report).await?;
            }
        }
        Command::Products => println!("{}", render::products(&client.products().await?)),
        Command::Product { id } => println!("{}", render::product(&client.product(&id).await?)),
        Command::Categories => println!("{}", render::categories(&client.categories().await?)),
        Command::AddProduct {
            fields,
            warehouse_stock,
        } => {
            let ack = client.add_product(fields.into_draft(warehouse_stock)).await?;
            print_ack(&ack, "Product added successfully");
        }
        Command::UpdateProduct { id, fields } => {
            let current = client.product(&id).await?;
            let draft = fields.apply(ProductDraft::from(&current));
            let ack = client.update_product(&id, draft).await?;
            print_ack(&ack, "Product updated successfully");
        }
        Command::DeleteProduct { id } => {
            let ack = client.delete_product(&id).await?;
            print_ack(&ack, "Product deleted successfully");
        }
        Command::BulkUpload { file } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let ack = client.bulk_upload(&file_name(&file), contents).await?;
            print_ack(&ack, "File uploaded successfully");
        }
        Command::UploadImage { id, file } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let ack = client.upload_image(&id, &file_name(&file), contents).await?;
            print_ack(&ack, "Image uploaded successfully");
        }
        Command::Orders => println!("{}", render::orders(&client.orders().await?)),
        Command::Order { id } => println!("{}", render::order_details(&client.order(id).await?)),
        Command::SetOrderStatus { id, status } => {
            let ack = client.update_order_status(id, status).await?;
            print_ack(&ack, &format!("Order {id} status updated to {status}"));
        }
        Command::Invoice { id, output_dir } => {
            let pdf = client.invoice(id).await?;
            let path = output_dir.join(invoice_file_name(id));
            tokio::fs::write(&path, pdf)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Saved {}", path.display());
        }
        Command::Returns => println!("{}", render::returns(&client.returns().await?)),
        Command::Return { id } => println!("{}", render::returns(&[client.return_request(id).await?])),
        Command::SetReturnStatus { id, status } => {
            let ack = client.update_return_status(id, status).await?;
            print_ack(&ack, &format!("Return {id} status updated to {status}"));
        }
        Command::Refunds => println!("{}", render::refunds(&client.refunds().await?)),
        Command::Refund { id } => {
            let request = client.return_request(id).await?;
            let ack = client.refund(&request).await?;
            print_ack(&ack, &format!("Refund issued successfully for Return ID: {id}"));
        }
        Command::Replace { id } => {
            let request = client.return_request(id).await?;
            let ack = client.replace(&request).await?;
            print_ack(&ack, &format!("Replacement order created successfully for Return ID: {id}"));
        }
    }

    Ok(())
}

async fn login(client: &ApiClient, credentials: Credentials) -> Result<()> {
    let session = client.login(&credentials).await?;
    let roles = client.admin_roles().await?;

    let landing = match landing_route(&roles) {
        Ok(landing) => landing,
        Err(e) => {
            client.logout();
            return Err(e.into());
        }
    };

    let Resolution::Render(start) = resolve(landing.path(), client.session()) else {
        bail!("landing page {} is not reachable", landing.path());
    };

    println!("export STOREADMIN_TOKEN={}", session.token());
    println!("export STOREADMIN_ADMIN_ID={}", session.admin_id());
    eprintln!("Logged in. Start at {} ({}).", landing.label(), start.path());
    Ok(())
}

async fn inventory_once(
    client: &ApiClient,
    state: &DashboardState,
    filter: &RowFilter,
    pagination: Pagination,
    with_report: bool,
) -> Result<()> {
    let inventory_slot = state.inventory_slot();
    let ticket = inventory_slot.issue();
    inventory_slot.apply(ticket, Ok(client.realtime_inventory().await?));

    if with_report {
        let report_slot = state.report_slot();
        let ticket = report_slot.issue();
        let outcome = client.inventory_report().await.map_err(|e| e.error_message());
        report_slot.apply(ticket, outcome);
    }

    println!("{}", render_dashboard(state, filter, pagination, with_report));
    Ok(())
}

async fn watch_inventory(
    client: ApiClient,
    config: &ClientConfig,
    state: Arc<DashboardState>,
    filter: &RowFilter,
    pagination: Pagination,
    with_report: bool,
) -> Result<()> {
    let poller = InventoryPoller::start(Arc::new(client), state.clone(), config.poll_interval);
    eprintln!("Loading inventory...");

    let mut rejected = false;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl-C")?;
                break;
            }
            _ = poller.session_rejected() => {
                rejected = true;
                break;
            }
            _ = poller.changed() => {
                // Clear the screen and home the cursor.
                print!("\x1B[2J\x1B[H");
                println!("{}", render_dashboard(&state, filter, pagination, with_report));
            }
        }
    }

    poller.shutdown().await;
    if rejected {
        return Err(ClientError::Unauthenticated.into());
    }
    Ok(())
}

fn render_dashboard(state: &DashboardState, filter: &RowFilter, pagination: Pagination, with_report: bool) -> String {
    let mut sections = Vec::new();

    if let Some(updated) = state.last_updated() {
        sections.push(format!("Last updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let Some(error) = state.inventory_error() {
        sections.push(error);
    }
    sections.push(render::alerts(&state.alerts()));
    sections.push(render::inventory(&state.inventory_view(
        filter,
        pagination.page,
        pagination.rows_per_page,
    )));

    if with_report {
        if let Some(error) = state.report_error() {
            sections.push(error);
        }
        if let Some(report) = state.report() {
            sections.push(format!(
                "Demand Forecast\n{}",
                render::demand_forecast(&report.demand_prediction, Pagination::forecast_default())
            ));
            sections.push(format!("Inventory Turnover\n{}", render::turnover(&report.inventory_turnover)));
            sections.push(format!("Popular Products\n{}", render::popular_products(&report.popular_products)));
        }
    }

    sections.join("\n\n")
}

fn print_ack(ack: &ApiMessage, fallback: &str) {
    println!("{}", ack.text().unwrap_or(fallback));
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_of(args: &[&str]) -> Option<Route> {
        let cli = Cli::try_parse_from(std::iter::once("storeadmin").chain(args.iter().copied())).unwrap();
        cli.command.screen()
    }

    #[test]
    fn commands_map_to_panel_pages() {
        assert_eq!(screen_of(&["refund", "3"]), Some(Route::Return(ReturnId::new(3))));
        assert_eq!(screen_of(&["invoice", "12"]), Some(Route::Order(OrderId::new(12))));
        assert_eq!(screen_of(&["inventory", "--watch"]), Some(Route::InventoryDashboard));
        assert_eq!(screen_of(&["nav"]), None);
    }

    #[test]
    fn guard_lets_login_through_and_stops_the_rest_without_session() {
        let session = SessionStore::new();

        let login = screen_of(&["login", "--email", "a@b.c", "--password", "pw"]).unwrap();
        assert_eq!(resolve(&login.path(), &session), Resolution::Render(Route::Login));

        let orders = screen_of(&["orders"]).unwrap();
        assert_eq!(resolve(&orders.path(), &session), Resolution::Redirect("/"));
    }
}
