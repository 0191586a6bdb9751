//! ShopTrack API client
//!
//! Thin wrapper over the backend REST API. Every call is one attempt; the
//! `{success, data, message}` envelope is unwrapped and failures of any kind
//! come back as a [`Error`] with a human-readable message.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};
use url::{form_urlencoded, Url};

use crate::domain::result::{Envelope, Error, Result};
use crate::domain::{
    Action, Credentials, HistoryEntry, HistoryInput, Product, ProductInput, Registration,
    Session, StockOperation, ValidatedSession,
};
use crate::ports::{HttpRequest, HttpResponse, Method, TokenStore, Transport};

/// Default threshold for the low-stock listing
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// API client bound to one base URL
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed)
            .map_err(|e| Error::config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url: trimmed.to_string(),
            transport,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Generic request
    // =========================================================================

    /// Send one request and unwrap the response envelope.
    ///
    /// Attaches `Authorization: Bearer <token>` whenever a token is stored.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
    ) -> Result<Envelope<T>> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.tokens.load()? {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body,
        };

        debug!(%method, endpoint, "Sending API request");
        let response = self.transport.send(&request).map_err(|e| {
            warn!(%method, endpoint, error = %e, "API request failed");
            e
        })?;
        debug!(%method, endpoint, status = response.status, "API response received");

        decode_response(endpoint, response)
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request(Method::Get, endpoint, None)
    }

    pub fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Envelope<T>> {
        self.request(Method::Post, endpoint, Some(serde_json::to_string(body)?))
    }

    /// POST without a body (stock operations, logout)
    pub fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request(Method::Post, endpoint, None)
    }

    pub fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Envelope<T>> {
        self.request(Method::Put, endpoint, Some(serde_json::to_string(body)?))
    }

    pub fn put_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request(Method::Put, endpoint, None)
    }

    pub fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request(Method::Delete, endpoint, None)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn register(&self, registration: &Registration) -> Result<Envelope<Session>> {
        self.post("/auth/register", registration)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<Envelope<Session>> {
        self.post("/auth/login", credentials)
    }

    pub fn logout(&self) -> Result<Envelope<JsonValue>> {
        self.post_empty("/auth/logout")
    }

    pub fn validate(&self) -> Result<Envelope<ValidatedSession>> {
        self.get("/auth/validate")
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn get_products(&self) -> Result<Envelope<Vec<Product>>> {
        self.get("/products/")
    }

    pub fn get_product(&self, product_id: i64) -> Result<Envelope<Product>> {
        self.get(&format!("/products/{}", product_id))
    }

    pub fn create_product(&self, product: &ProductInput) -> Result<Envelope<JsonValue>> {
        self.post("/products/", product)
    }

    pub fn update_product(
        &self,
        product_id: i64,
        product: &ProductInput,
    ) -> Result<Envelope<JsonValue>> {
        self.put(&format!("/products/{}", product_id), product)
    }

    pub fn delete_product(&self, product_id: i64) -> Result<Envelope<JsonValue>> {
        self.delete(&format!("/products/{}", product_id))
    }

    pub fn update_stock(
        &self,
        product_id: i64,
        operation: StockOperation,
        quantity: u32,
    ) -> Result<Envelope<JsonValue>> {
        self.post_empty(&format!(
            "/products/{}/stock/{}/{}",
            product_id,
            operation.as_str(),
            quantity
        ))
    }

    pub fn add_stock(&self, product_id: i64, quantity: u32) -> Result<Envelope<JsonValue>> {
        self.update_stock(product_id, StockOperation::Add, quantity)
    }

    pub fn remove_stock(&self, product_id: i64, quantity: u32) -> Result<Envelope<JsonValue>> {
        self.update_stock(product_id, StockOperation::Remove, quantity)
    }

    pub fn set_stock(&self, product_id: i64, quantity: u32) -> Result<Envelope<JsonValue>> {
        self.update_stock(product_id, StockOperation::Set, quantity)
    }

    pub fn update_price(&self, product_id: i64, price: Decimal) -> Result<Envelope<JsonValue>> {
        self.put_empty(&format!(
            "/products/{}/price/{}",
            product_id,
            price.normalize()
        ))
    }

    pub fn search_products(&self, query: &str) -> Result<Envelope<Vec<Product>>> {
        self.get(&format!("/products/search/{}", encode_segment(query)))
    }

    pub fn get_low_stock_products(&self, threshold: i64) -> Result<Envelope<Vec<Product>>> {
        self.get(&format!("/products/low-stock?threshold={}", threshold))
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn get_history(&self) -> Result<Envelope<Vec<HistoryEntry>>> {
        self.get("/history/")
    }

    pub fn get_history_entry(&self, history_id: i64) -> Result<Envelope<HistoryEntry>> {
        self.get(&format!("/history/{}", history_id))
    }

    pub fn create_transaction(&self, transaction: &HistoryInput) -> Result<Envelope<JsonValue>> {
        self.post("/history/", transaction)
    }

    pub fn update_transaction(
        &self,
        history_id: i64,
        transaction: &HistoryInput,
    ) -> Result<Envelope<JsonValue>> {
        self.put(&format!("/history/{}", history_id), transaction)
    }

    pub fn delete_transaction(&self, history_id: i64) -> Result<Envelope<JsonValue>> {
        self.delete(&format!("/history/{}", history_id))
    }

    pub fn get_transactions_by_action(&self, action: Action) -> Result<Envelope<Vec<HistoryEntry>>> {
        self.get(&format!("/history/action/{}", action.as_str()))
    }

    pub fn get_transactions_by_product(
        &self,
        product_id: i64,
    ) -> Result<Envelope<Vec<HistoryEntry>>> {
        self.get(&format!("/history/product/{}", product_id))
    }
}

/// Percent-encode one path segment (spaces as `%20`, not `+`)
fn encode_segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Pull a server-provided error message out of a response body, if any
fn body_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

fn decode_response<T: DeserializeOwned>(endpoint: &str, response: HttpResponse) -> Result<Envelope<T>> {
    if !response.is_success() {
        let message = body_message(&response.body)
            .unwrap_or_else(|| format!("HTTP error! status: {}", response.status));
        error!(endpoint, status = response.status, %message, "HTTP error response");
        return Err(Error::Http {
            status: response.status,
            message,
        });
    }

    let envelope: Envelope<JsonValue> = serde_json::from_str(&response.body)
        .map_err(|e| Error::Decode(e.to_string()))?;

    if !envelope.success {
        let message = envelope.message_or("Request failed");
        error!(endpoint, %message, "Backend error response");
        return Err(Error::Api(message));
    }

    let data = match envelope.data {
        None | Some(JsonValue::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<T>(value).map_err(|e| Error::Decode(e.to_string()))?,
        ),
    };

    Ok(Envelope {
        success: true,
        data,
        message: envelope.message,
    })
}
