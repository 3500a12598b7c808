use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};

use storeadmin_auth::{Credentials, Dashboard, Session, SessionStore, landing_route};
use storeadmin_client::{ApiClient, ClientError, DashboardState, InventoryPoller};
use storeadmin_core::{AdminId, DomainError, OrderId, ProductId, ReturnId};
use storeadmin_inventory::{RowFilter, StockStatus, Thresholds};
use storeadmin_products::ProductDraft;
use storeadmin_sales::{OrderStatus, ReturnStatus};

const TOKEN: &str = "tok-123";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

type Reply = (StatusCode, Json<Value>);

/// What the stub backend has seen.
#[derive(Default)]
struct Seen {
    refunds: AtomicUsize,
    status_updates: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<(String, String, usize)>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn rejected() -> Reply {
    (StatusCode::UNAUTHORIZED, Json(json!({"msg": "Token has expired"})))
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["email"] == "ada@example.com" && body["password"] == "secret" {
        ok(json!({"access_token": TOKEN, "user_id": 7}))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid email or password"})))
    }
}

async fn roles(headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    if id != 7 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Admin not found"})));
    }
    ok(json!({"roles": ["Inventory Manager", "Order Manager"], "is_super_admin": false}))
}

async fn realtime_inventory(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    ok(json!({
        "12": {"product_name": "Widget", "category_name": "Tools",
               "warehouses": [{"warehouse_id": 2, "stock_quantity": 5}, {"warehouse_id": 1, "stock_quantity": 18}]},
        "3": {"product_name": "Gadget", "category_name": "Electronics",
              "warehouses": [{"warehouse_id": 1, "stock_quantity": 40}]},
        "8": {"product_name": "Gizmo", "category_name": "Tools", "warehouses": null}
    }))
}

async fn inventory_report(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    ok(json!({
        "demand_prediction": [{"product": "Widget", "predicted_demand": 12.3456}],
        "inventory_turnover": {"cogs": 1200.0, "average_inventory": 300.0, "turnover_rate": 4.0},
        "popular_products": [{"name": "Widget", "total_sold": 31}]
    }))
}

async fn orders(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    ok(json!([
        {"OrderID": 1, "OrderDate": "2024-05-01", "OrderStatus": "Pending", "TotalAmount": 20.5, "PaymentStatus": "Paid"},
        {"OrderID": 2, "OrderDate": "2024-05-02", "OrderStatus": "Shipped", "TotalAmount": 99}
    ]))
}

async fn order(headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Order not found"})));
    }
    ok(json!({
        "order": {"OrderID": 1, "OrderDate": "2024-05-01", "OrderStatus": "Pending", "TotalAmount": 20.5,
                  "ShippingCost": 4.0, "TaxRate": 0.1, "PaymentStatus": "Paid", "CustomerName": "Grace"},
        "products": [{"ProductName": "Widget", "Quantity": 2}]
    }))
}

async fn update_order_status(
    State(seen): State<Arc<Seen>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    let status = body["status"].as_str().unwrap_or_default().to_string();
    if let Ok(mut updates) = seen.status_updates.lock() {
        updates.push(body);
    }
    ok(json!({"message": format!("Order {id} status updated to {status}")}))
}

async fn return_request(headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    let status = if id == 5 { "Approved" } else { "Pending" };
    ok(json!({"ReturnID": id, "OrderID": 1, "Reason": "Damaged", "ReturnDate": "2024-05-03",
              "ReturnStatus": status, "RAction": "Refund", "ReplacementOffered": 0}))
}

async fn refund(State(seen): State<Arc<Seen>>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    seen.refunds.fetch_add(1, Ordering::SeqCst);
    ok(json!({"message": format!("Refund processed successfully for Return ID {id}")}))
}

async fn bulk_upload(State(seen): State<Arc<Seen>>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    if !authorized(&headers) {
        return rejected();
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        if let Ok(mut uploads) = seen.uploads.lock() {
            uploads.push((name, file_name, len));
        }
    }
    (StatusCode::CREATED, Json(json!({"message": "Products uploaded successfully"})))
}

/// Accepts the request and never answers.
async fn unresponsive() -> Reply {
    std::future::pending().await
}

fn stub_backend(seen: Arc<Seen>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/admin/:id/roles", get(roles))
        .route("/inventory/realtime-inventory", get(realtime_inventory))
        .route("/inventory/inventory-report", get(inventory_report))
        .route("/product/bulk-upload", post(bulk_upload))
        .route("/orders/all", get(orders))
        .route("/orders/refunds", get(unresponsive))
        .route("/orders/:id", get(order))
        .route("/orders/:id/update-status", put(update_order_status))
        .route("/orders/returns/:id", get(return_request))
        .route("/orders/returns/:id/refund", post(refund))
        .with_state(seen)
}

struct TestServer {
    base_url: String,
    seen: Arc<Seen>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let seen = Arc::new(Seen::default());
        let app = stub_backend(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, seen, handle }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone(), Arc::new(SessionStore::new()), REQUEST_TIMEOUT).unwrap()
    }

    fn logged_in_client(&self, token: &str) -> ApiClient {
        let session = Session::new(token, AdminId::new(7), Utc::now());
        ApiClient::new(self.base_url.clone(), Arc::new(SessionStore::with_session(session)), REQUEST_TIMEOUT).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "ada@example.com".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_stores_session_used_by_later_calls() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    let session = client.login(&credentials("secret")).await.unwrap();
    assert_eq!(session.token(), TOKEN);
    assert_eq!(session.admin_id(), AdminId::new(7));
    assert!(client.session().is_authenticated());

    let roles = client.admin_roles().await.unwrap();
    assert_eq!(landing_route(&roles).unwrap(), Dashboard::Inventory);

    let orders = client.orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].status, OrderStatus::Shipped);
    assert_eq!(orders[1].total_amount, 99.0);
}

#[tokio::test]
async fn failed_login_surfaces_server_error_and_keeps_no_session() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    let err = client.login(&credentials("wrong")).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(401, _)));
    assert_eq!(err.error_message(), "Invalid email or password");
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn rejected_token_is_unauthenticated() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client("expired");

    let err = client.realtime_inventory().await.unwrap_err();
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn logout_clears_credentials_for_every_call() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);
    assert!(client.orders().await.is_ok());

    assert!(client.logout().is_some());
    assert!(client.orders().await.unwrap_err().is_unauthenticated());
    assert!(client.admin_roles().await.unwrap_err().is_unauthenticated());
}

#[tokio::test]
async fn realtime_inventory_builds_the_table() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let snapshot = client.realtime_inventory().await.unwrap();
    let ids: Vec<&str> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["12", "3", "8"]);

    let state = DashboardState::new(Thresholds::default());
    let slot = state.inventory_slot();
    slot.apply(slot.issue(), Ok(snapshot));

    let view = state.inventory_view(&RowFilter::default(), 0, 10);
    assert_eq!(view.total_count, 3);
    assert_eq!(view.rows[0].row.product_id, ProductId::from("12"));
    assert_eq!(view.rows[0].status, StockStatus::Critical);
    assert_eq!(view.rows[1].status, StockStatus::Low);
    assert_eq!(view.category_options, ["Electronics", "Tools"]);
    assert_eq!(state.alerts().len(), 1);
}

#[tokio::test]
async fn inventory_report_accepts_backend_shapes() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let report = client.inventory_report().await.unwrap();
    assert_eq!(report.demand_prediction[0].product_name, "Widget");
    assert_eq!(report.demand_prediction[0].display_demand(), "12.35");
    assert_eq!(report.inventory_turnover.points()[0].turnover_rate, 4.0);
    assert_eq!(report.popular_products[0].total_sold, 31);
}

#[tokio::test]
async fn order_details_and_missing_order() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let details = client.order(OrderId::new(1)).await.unwrap();
    assert_eq!(details.order.customer_name.as_deref(), Some("Grace"));
    assert_eq!(details.products[0].product_name, "Widget");

    let err = client.order(OrderId::new(99)).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(404, _)));
    assert_eq!(err.error_message(), "Order not found");
}

#[tokio::test]
async fn order_status_update_sends_status_body() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let ack = client
        .update_order_status(OrderId::new(1), OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(ack.text(), Some("Order 1 status updated to Delivered"));

    let updates = srv.seen.status_updates.lock().unwrap();
    assert_eq!(updates.as_slice(), [json!({"status": "Delivered"})]);
}

#[tokio::test]
async fn refund_requires_approved_return() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let pending = client.return_request(ReturnId::new(4)).await.unwrap();
    assert_eq!(pending.status, ReturnStatus::Pending);
    let err = client.refund(&pending).await.unwrap_err();
    assert!(matches!(err, ClientError::Domain(DomainError::InvariantViolation(_))));
    assert_eq!(srv.seen.refunds.load(Ordering::SeqCst), 0);

    let approved = client.return_request(ReturnId::new(5)).await.unwrap();
    let ack = client.refund(&approved).await.unwrap();
    assert!(ack.text().unwrap().contains("Return ID 5"));
    assert_eq!(srv.seen.refunds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_product_never_reaches_backend() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let draft = ProductDraft {
        name: "Mat".to_string(),
        description: "Non-slip".to_string(),
        price: -3.0,
        size: None,
        color: None,
        material: None,
        stock_quantity: 1,
        category_id: None,
        subcategory_id: None,
        featured: false,
        warehouse_stock: Vec::new(),
    };
    // The stub has no /product/add route; reaching it would be a 404.
    let err = client.add_product(draft).await.unwrap_err();
    assert!(matches!(err, ClientError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn bulk_upload_sends_csv_as_file_field() {
    let srv = TestServer::spawn().await;
    let client = srv.logged_in_client(TOKEN);

    let csv = b"name,price,stock_quantity\nTea,4.5,10\n".to_vec();
    let len = csv.len();
    let ack = client.bulk_upload("products.csv", csv).await.unwrap();
    assert_eq!(ack.text(), Some("Products uploaded successfully"));

    let uploads = srv.seen.uploads.lock().unwrap();
    assert_eq!(uploads.as_slice(), [("file".to_string(), "products.csv".to_string(), len)]);
}

#[tokio::test]
async fn poller_fills_dashboard_from_backend() {
    let srv = TestServer::spawn().await;
    let client = Arc::new(srv.logged_in_client(TOKEN));
    let state = Arc::new(DashboardState::new(Thresholds::default()));

    let poller = InventoryPoller::start(client, state.clone(), Duration::from_millis(50));
    for _ in 0..100 {
        if state.snapshot().is_some() && state.report().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    poller.shutdown().await;

    assert_eq!(state.snapshot().map(|s| s.len()), Some(3));
    assert!(state.report().is_some());
    assert_eq!(state.inventory_error(), None);
}

#[tokio::test]
async fn unanswered_request_times_out() {
    let srv = TestServer::spawn().await;
    let session = Session::new(TOKEN, AdminId::new(7), Utc::now());
    let client = ApiClient::new(
        srv.base_url.clone(),
        Arc::new(SessionStore::with_session(session)),
        Duration::from_millis(200),
    )
    .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), client.refunds()).await;
    let err = outcome.expect("client gave up on its own").unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "{err:?}");
}
