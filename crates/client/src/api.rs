//! REST client for the store backend.
//!
//! Every authenticated call takes its bearer token from the shared
//! [`SessionStore`]; there is no other source of credentials.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storeadmin_auth::{AdminRoles, Credentials, LoginResponse, Session, SessionStore};
use storeadmin_core::{DomainError, OrderId, ProductId, ReturnId};
use storeadmin_inventory::{InventoryReport, InventorySnapshot};
use storeadmin_products::{Category, Product, ProductDraft, ProductList};
use storeadmin_sales::{
    OrderDetails, OrderStatus, OrderSummary, RefundRecord, ReturnAction, ReturnRequest, ReturnStatus, StatusUpdate,
};

/// Failure of a backend call.
///
/// Transient and permanent failures are not told apart; callers show
/// [`ClientError::error_message`] inline and move on.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session, or the backend rejected the token. The view goes back to login.
    #[error("authentication required")]
    Unauthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    /// Rejected client-side before any request was made.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ClientError {
    /// The string a view renders in place of its content.
    pub fn error_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => "Please log in to continue.".to_string(),
            ClientError::Api(_, message) if !message.is_empty() => message.clone(),
            ClientError::Domain(err) => err.message().to_string(),
            ClientError::Network(_) | ClientError::Parse(_) | ClientError::Api(..) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated)
    }
}

/// `{"message": ...}` or `{"error": ...}` body returned by mutations and failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

fn server_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|m| m.text().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Every request, including connect and body, is abandoned after `timeout`.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/product/{id}` plus an optional action segment. Ids that would
    /// escape their segment are refused before any request is built.
    fn product_path(id: &ProductId, action: Option<&str>) -> Result<String, ClientError> {
        if !id.is_path_safe() {
            return Err(DomainError::invalid_id(format!("ProductId: '{id}' is not a single path segment")).into());
        }
        Ok(match action {
            Some(action) => format!("/product/{id}/{action}"),
            None => format!("/product/{id}"),
        })
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.session.bearer().map_err(|_| ClientError::Unauthenticated)?;
        tracing::debug!(%method, path, "request");
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let resp = request.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("backend rejected the session token");
            return Err(ClientError::Unauthenticated);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "request failed");
        Err(ClientError::Api(status.as_u16(), server_message(&body)))
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        resp.json().await.map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn message(resp: Response) -> Result<ApiMessage, ClientError> {
        let body = resp.text().await.map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.send(self.authorized(Method::GET, path)?).await?;
        Self::json(resp).await
    }

    async fn mutate<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<ApiMessage, ClientError> {
        let resp = self.send(self.authorized(method, path)?.json(body)).await?;
        Self::message(resp).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────

    /// `POST /auth/login`. On success the session store holds the new session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ClientError> {
        tracing::debug!(email = %credentials.email, "login");
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "login rejected");
            return Err(ClientError::Api(status.as_u16(), server_message(&body)));
        }

        let login: LoginResponse = Self::json(resp).await?;
        let session = Session::from_login(login, Utc::now());
        self.session.login(session.clone());
        Ok(session)
    }

    pub fn logout(&self) -> Option<Session> {
        self.session.logout()
    }

    /// `GET /admin/{id}/roles` for the logged-in admin.
    pub async fn admin_roles(&self) -> Result<AdminRoles, ClientError> {
        let admin_id = self.session.admin_id().map_err(|_| ClientError::Unauthenticated)?;
        self.get(&format!("/admin/{admin_id}/roles")).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        let list: ProductList = self.get("/product/all").await?;
        Ok(list.products)
    }

    pub async fn product(&self, id: &ProductId) -> Result<Product, ClientError> {
        self.get(&Self::product_path(id, None)?).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("/product/categories").await
    }

    /// Validates the draft first; an invalid draft never reaches the network.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<ApiMessage, ClientError> {
        let draft = draft.validated()?;
        self.mutate(Method::POST, "/product/add", &draft).await
    }

    pub async fn update_product(&self, id: &ProductId, draft: ProductDraft) -> Result<ApiMessage, ClientError> {
        let draft = draft.validated()?;
        self.mutate(Method::PUT, &Self::product_path(id, Some("update"))?, &draft).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<ApiMessage, ClientError> {
        let resp = self
            .send(self.authorized(Method::DELETE, &Self::product_path(id, Some("delete"))?)?)
            .await?;
        Self::message(resp).await
    }

    /// `POST /product/bulk-upload` with the CSV in the `file` field.
    pub async fn bulk_upload(&self, file_name: &str, contents: Vec<u8>) -> Result<ApiMessage, ClientError> {
        if contents.is_empty() {
            return Err(DomainError::validation("Please select a file to upload.").into());
        }
        let part = multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .send(self.authorized(Method::POST, "/product/bulk-upload")?.multipart(form))
            .await?;
        Self::message(resp).await
    }

    /// `POST /product/{id}/upload-image` with the image in the `image` field.
    pub async fn upload_image(&self, id: &ProductId, file_name: &str, contents: Vec<u8>) -> Result<ApiMessage, ClientError> {
        if contents.is_empty() {
            return Err(DomainError::validation("Please select an image to upload.").into());
        }
        let part = multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = multipart::Form::new().part("image", part);
        let resp = self
            .send(self.authorized(Method::POST, &Self::product_path(id, Some("upload-image"))?)?.multipart(form))
            .await?;
        Self::message(resp).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inventory
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError> {
        self.get("/inventory/realtime-inventory").await
    }

    pub async fn inventory_report(&self) -> Result<InventoryReport, ClientError> {
        self.get("/inventory/inventory-report").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders and returns
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn orders(&self) -> Result<Vec<OrderSummary>, ClientError> {
        self.get("/orders/all").await
    }

    pub async fn order(&self, id: OrderId) -> Result<OrderDetails, ClientError> {
        self.get(&format!("/orders/{id}")).await
    }

    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<ApiMessage, ClientError> {
        self.mutate(Method::PUT, &format!("/orders/{id}/update-status"), &StatusUpdate::from(status))
            .await
    }

    /// Raw PDF bytes of the order's invoice.
    pub async fn invoice(&self, id: OrderId) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .send(self.authorized(Method::GET, &format!("/orders/{id}/invoice"))?)
            .await?;
        let bytes = resp.bytes().await.map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    pub async fn returns(&self) -> Result<Vec<ReturnRequest>, ClientError> {
        self.get("/orders/returns").await
    }

    pub async fn return_request(&self, id: ReturnId) -> Result<ReturnRequest, ClientError> {
        self.get(&format!("/orders/returns/{id}")).await
    }

    pub async fn update_return_status(&self, id: ReturnId, status: ReturnStatus) -> Result<ApiMessage, ClientError> {
        self.mutate(
            Method::PUT,
            &format!("/orders/returns/{id}/update-status"),
            &StatusUpdate::from(status),
        )
        .await
    }

    pub async fn refunds(&self) -> Result<Vec<RefundRecord>, ClientError> {
        self.get("/orders/refunds").await
    }

    pub async fn refund(&self, request: &ReturnRequest) -> Result<ApiMessage, ClientError> {
        request.ensure_actionable(ReturnAction::Refund)?;
        self.mutate(
            Method::POST,
            &format!("/orders/returns/{}/refund", request.return_id),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn replace(&self, request: &ReturnRequest) -> Result<ApiMessage, ClientError> {
        request.ensure_actionable(ReturnAction::Replace)?;
        self.mutate(
            Method::POST,
            &format!("/orders/returns/{}/replace", request.return_id),
            &serde_json::json!({}),
        )
        .await
    }
}
