use reqwest::{multipart, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::routes::{Navigator, Route};
use crate::store::TokenStore;

use super::models::{
    ArchiveTable, BulkAdjustment, ImportReport, InventoryAdjustment, InvoiceReceipt,
    InvoiceRequest, LogEntry, LoginRequest, LoginResponse, MarkupUpdate, Product, ReorderUpdate,
    VerifyResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message}")]
    RequestFailed { message: String, status: u16 },
    #[error("Unauthorized")]
    Unauthorized,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Single chokepoint for every call to the tracker backend.
///
/// Attaches the bearer header when the store holds a token, normalizes
/// failures into [`ClientError`], and on any 401 clears the credential store
/// and reports the forced logout through the injected [`Navigator`]. The
/// low-level sender itself performs no navigation. One attempt per call; no
/// retry, no timeout.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    navigator: Arc<dyn Navigator>,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        http: reqwest::Client,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            navigator,
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach `Authorization: Bearer <token>` when logged in.
    ///
    /// An unreadable store is treated as logged out; the server will answer
    /// 401 and the normal forced-logout path takes over.
    fn with_bearer(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.token() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                tracing::warn!(error = %e, "Credential store unreadable; sending request unauthenticated");
                builder
            }
        }
    }

    /// Send one request and normalize the outcome.
    ///
    /// Every endpoint, JSON and multipart alike, funnels through here, so
    /// the 401 contract holds uniformly: clear credentials, redirect to
    /// login, fail the call with [`ClientError::Unauthorized`].
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.with_bearer(builder).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "Failed to clear credentials after 401");
            }
            tracing::debug!("Backend rejected credentials; session terminated");
            self.navigator.redirect(Route::Login, None);
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
            return Err(ClientError::RequestFailed {
                message,
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(&self, pin: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            pin: pin.to_string(),
        };
        self.execute(self.http.post(self.url("/auth/login")).json(&body))
            .await
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        self.execute(self.http.get(self.url("/auth/verify"))).await
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn get_products(&self) -> Result<Vec<Product>, ClientError> {
        self.execute(self.http.get(self.url("/products"))).await
    }

    pub async fn update_markup(
        &self,
        material_no: &str,
        markup_pct: f64,
    ) -> Result<Product, ClientError> {
        let path = format!("/products/{}/markup", urlencoding::encode(material_no));
        self.execute(
            self.http
                .put(self.url(&path))
                .json(&MarkupUpdate { markup_pct }),
        )
        .await
    }

    pub async fn update_reorder(
        &self,
        material_no: &str,
        reorder_point: i64,
    ) -> Result<Product, ClientError> {
        let path = format!("/products/{}/reorder", urlencoding::encode(material_no));
        self.execute(
            self.http
                .put(self.url(&path))
                .json(&ReorderUpdate { reorder_point }),
        )
        .await
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    pub async fn adjust_inventory(
        &self,
        adjustment: &InventoryAdjustment,
    ) -> Result<Product, ClientError> {
        self.execute(
            self.http
                .post(self.url("/inventory/adjust"))
                .json(adjustment),
        )
        .await
    }

    pub async fn bulk_adjust(
        &self,
        adjustments: Vec<InventoryAdjustment>,
    ) -> Result<Vec<Product>, ClientError> {
        self.execute(
            self.http
                .post(self.url("/inventory/bulk-adjust"))
                .json(&BulkAdjustment { adjustments }),
        )
        .await
    }

    pub async fn get_log(&self, limit: u32) -> Result<Vec<LogEntry>, ClientError> {
        self.execute(
            self.http
                .get(self.url("/inventory/log"))
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub async fn get_low_stock(&self) -> Result<Vec<Product>, ClientError> {
        self.execute(self.http.get(self.url("/inventory/low-stock")))
            .await
    }

    // ========================================================================
    // Price list
    // ========================================================================

    pub async fn get_price_list_archive(&self) -> Result<ArchiveTable, ClientError> {
        self.execute(self.http.get(self.url("/pricelist/archive")))
            .await
    }

    /// Upload a supplier CSV to refresh costs.
    ///
    /// Multipart, so the JSON content-type default does not apply, but the
    /// bearer header and the 401 forced-logout path do.
    pub async fn import_price_list(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ImportReport, ClientError> {
        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);
        self.execute(self.http.post(self.url("/pricelist/import")).multipart(form))
            .await
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    /// File an invoice: structured data plus the rendered PDF.
    pub async fn file_invoice(
        &self,
        invoice: &InvoiceRequest,
        pdf: Vec<u8>,
    ) -> Result<InvoiceReceipt, ClientError> {
        let payload = serde_json::to_string(invoice)?;
        let part = multipart::Part::bytes(pdf)
            .file_name("invoice.pdf")
            .mime_str("application/pdf")?;
        let form = multipart::Form::new()
            .text("invoice_data", payload)
            .part("pdf", part);
        self.execute(self.http.post(self.url("/invoices/file")).multipart(form))
            .await
    }
}
