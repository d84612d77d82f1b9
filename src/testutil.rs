//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;

use crate::api::models::{
    ArchiveTable, BulkAdjustment, ImportReport, InventoryAdjustment, InvoiceReceipt,
    InvoiceRequest, LogEntry, LoginRequest, LoginResponse, MarkupUpdate, Product, ReorderUpdate,
};
use crate::config::Config;
use crate::routes::{Navigator, Route};
use crate::store::TokenStore;
use crate::AppContext;

// ============================================================================
// Mock tracker backend
// ============================================================================

/// Scripted behavior for the in-process mock backend.
///
/// Flags are plain atomics/mutexes so a test can flip behavior between
/// requests while the server task keeps running.
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Strip the `detail` field from error bodies.
    pub bare_errors: AtomicBool,
    /// Answer 503 on `/products`.
    pub fail_products: AtomicBool,
    pub log_entries: Mutex<Vec<LogEntry>>,
    /// Role returned by a successful login.
    pub login_role: Mutex<String>,
    pub products: Mutex<Vec<Product>>,
    /// Answer 401 on every bearer-authenticated endpoint.
    pub reject_bearer: AtomicBool,
    /// Requests seen by `/auth/verify`, counted on arrival.
    pub verify_calls: AtomicUsize,
    /// Artificial latency for `/auth/verify`, to widen race windows.
    pub verify_delay_ms: AtomicU64,
    /// Role returned by a successful verify.
    pub verify_role: Mutex<String>,
}

impl MockBackend {
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let backend = MockBackend {
            login_role: Mutex::new("user".to_string()),
            products: Mutex::new(products),
            verify_role: Mutex::new("user".to_string()),
            ..MockBackend::default()
        };
        Arc::new(backend)
    }

    pub fn push_log_entry(&self, material_no: &str, change_type: &str, qty_changed: i64) {
        self.log_entries.lock().unwrap().push(LogEntry {
            timestamp: "2025-06-01 09:00:00".to_string(),
            product_name: format!("Product {material_no}"),
            material_no: material_no.to_string(),
            change_type: change_type.to_string(),
            qty_changed,
            previous_qty: 0,
            new_qty: qty_changed,
            changed_by: "web".to_string(),
            notes: String::new(),
        });
    }
}

/// A fully-populated product row for cache tests.
pub fn product(material_no: &str, qty_on_hand: i64, reorder_point: i64) -> Product {
    Product {
        row_number: 2,
        material_no: material_no.to_string(),
        formula_code: "F100".to_string(),
        product_name: format!("Product {material_no}"),
        product_form: "Pellet".to_string(),
        unit_weight: "50 LB".to_string(),
        purina_cost: 18.00,
        pallet_cost: 17.10,
        markup_pct: 25.0,
        retail_pre_tax: 22.50,
        retail_with_tax: 23.74,
        qty_on_hand,
        reorder_point,
        last_updated: "2025-06-01 09:00:00".to_string(),
        notes: String::new(),
    }
}

/// Bind the mock backend on an ephemeral port and return its `/api` base URL.
pub async fn spawn_backend(backend: Arc<MockBackend>) -> String {
    let app = router(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn router(backend: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/products", get(list_products))
        .route("/api/products/:material_no/markup", put(update_markup))
        .route("/api/products/:material_no/reorder", put(update_reorder))
        .route("/api/inventory/adjust", post(adjust))
        .route("/api/inventory/bulk-adjust", post(bulk_adjust))
        .route("/api/inventory/log", get(inventory_log))
        .route("/api/inventory/low-stock", get(low_stock))
        .route("/api/pricelist/archive", get(archive))
        .route("/api/pricelist/import", post(import_price_list))
        .route("/api/invoices/file", post(file_invoice))
        .with_state(backend)
}

fn error_response(backend: &MockBackend, status: StatusCode, detail: &str) -> Response {
    let body = if backend.bare_errors.load(Ordering::SeqCst) {
        json!({})
    } else {
        json!({ "detail": detail })
    };
    (status, Json(body)).into_response()
}

/// Bearer check applied by every authenticated endpoint.
fn authorize(backend: &MockBackend, headers: &HeaderMap) -> Result<(), Response> {
    if backend.reject_bearer.load(Ordering::SeqCst) {
        return Err(error_response(
            backend,
            StatusCode::UNAUTHORIZED,
            "Invalid token",
        ));
    }

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(token) if !token.is_empty() => Ok(()),
        _ => Err(error_response(
            backend,
            StatusCode::UNAUTHORIZED,
            "Not authenticated",
        )),
    }
}

async fn login(
    State(backend): State<Arc<MockBackend>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    if request.pin != "1234" {
        return error_response(&backend, StatusCode::UNAUTHORIZED, "Invalid PIN");
    }
    let role = backend.login_role.lock().unwrap().clone();
    Json(LoginResponse {
        expires_in_days: 7,
        role,
        token: "tok_test".to_string(),
    })
    .into_response()
}

async fn verify(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    backend.verify_calls.fetch_add(1, Ordering::SeqCst);

    let delay = backend.verify_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let user = backend.verify_role.lock().unwrap().clone();
    Json(json!({ "status": "authenticated", "user": user })).into_response()
}

async fn list_products(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    if backend.fail_products.load(Ordering::SeqCst) {
        return error_response(
            &backend,
            StatusCode::SERVICE_UNAVAILABLE,
            "sheet backend unavailable",
        );
    }
    Json(backend.products.lock().unwrap().clone()).into_response()
}

async fn update_markup(
    State(backend): State<Arc<MockBackend>>,
    Path(material_no): Path<String>,
    headers: HeaderMap,
    Json(request): Json<MarkupUpdate>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let mut products = backend.products.lock().unwrap();
    match products.iter_mut().find(|p| p.material_no == material_no) {
        Some(product) => {
            product.markup_pct = request.markup_pct;
            Json(product.clone()).into_response()
        }
        None => error_response(&backend, StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn update_reorder(
    State(backend): State<Arc<MockBackend>>,
    Path(material_no): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ReorderUpdate>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let mut products = backend.products.lock().unwrap();
    match products.iter_mut().find(|p| p.material_no == material_no) {
        Some(product) => {
            product.reorder_point = request.reorder_point;
            Json(product.clone()).into_response()
        }
        None => error_response(&backend, StatusCode::NOT_FOUND, "Product not found"),
    }
}

fn apply_adjustment(
    products: &mut [Product],
    adjustment: &InventoryAdjustment,
) -> Option<Product> {
    products
        .iter_mut()
        .find(|p| p.material_no == adjustment.material_no)
        .map(|product| {
            product.qty_on_hand += adjustment.quantity;
            product.clone()
        })
}

async fn adjust(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(adjustment): Json<InventoryAdjustment>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let mut products = backend.products.lock().unwrap();
    match apply_adjustment(&mut products, &adjustment) {
        Some(updated) => Json(updated).into_response(),
        None => error_response(&backend, StatusCode::NOT_FOUND, "Unknown material number"),
    }
}

async fn bulk_adjust(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(request): Json<BulkAdjustment>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let mut products = backend.products.lock().unwrap();
    let updated: Vec<Product> = request
        .adjustments
        .iter()
        .filter_map(|adjustment| apply_adjustment(&mut products, adjustment))
        .collect();
    Json(updated).into_response()
}

#[derive(Debug, Deserialize)]
struct LogParams {
    #[serde(default = "default_log_limit")]
    limit: usize,
}

fn default_log_limit() -> usize {
    100
}

async fn inventory_log(
    State(backend): State<Arc<MockBackend>>,
    Query(params): Query<LogParams>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let entries = backend.log_entries.lock().unwrap();
    let limited: Vec<LogEntry> = entries.iter().take(params.limit).cloned().collect();
    Json(limited).into_response()
}

async fn low_stock(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    let products = backend.products.lock().unwrap();
    let low: Vec<Product> = products
        .iter()
        .filter(|p| p.qty_on_hand <= p.reorder_point)
        .cloned()
        .collect();
    Json(low).into_response()
}

async fn archive(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    Json(ArchiveTable {
        headers: vec!["Material No".to_string(), "Price".to_string()],
        rows: vec![vec!["3006848-506".to_string(), "29.25".to_string()]],
    })
    .into_response()
}

async fn import_price_list(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let mut data_rows = 0u64;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let text = field.text().await.unwrap();
            data_rows = text.lines().skip(1).filter(|l| !l.is_empty()).count() as u64;
        }
    }

    Json(ImportReport {
        message: format!("Updated {data_rows} existing products, added 1 new products."),
        new_products: vec!["Test Feed".to_string()],
        updated: data_rows,
    })
    .into_response()
}

async fn file_invoice(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let mut invoice: Option<InvoiceRequest> = None;
    let mut pdf_bytes = 0usize;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("invoice_data") => {
                let text = field.text().await.unwrap();
                invoice = serde_json::from_str(&text).ok();
            }
            Some("pdf") => {
                pdf_bytes = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }

    match invoice {
        Some(invoice) if !invoice.customer_name.is_empty() && pdf_bytes > 0 => {
            Json(InvoiceReceipt {
                drive_url: "https://drive.example/inv-0001".to_string(),
                invoice_number: "INV-0001".to_string(),
                message: "Invoice filed successfully".to_string(),
            })
            .into_response()
        }
        _ => error_response(&backend, StatusCode::BAD_REQUEST, "Invalid invoice data"),
    }
}

// ============================================================================
// Context helpers
// ============================================================================

/// Navigator that records redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<(Route, Option<String>)>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<(Route, Option<String>)> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, to: Route, from: Option<String>) {
        self.redirects.lock().unwrap().push((to, from));
    }
}

/// Build a full `AppContext` against the given backend base URL.
///
/// Uses a `reqwest::Client` with proxy disabled (avoids macOS
/// system-configuration panics in sandboxed tests) and a store in a
/// temporary directory — the caller must keep the `TempDir` guard alive.
pub fn test_context(base_url: &str) -> (AppContext, Arc<RecordingNavigator>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let tokens = Arc::new(TokenStore::open(temp_dir.path()).unwrap());
    let navigator = Arc::new(RecordingNavigator::default());
    let config = Config {
        api_base_url: base_url.to_string(),
        data_dir: temp_dir.path().display().to_string(),
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let ctx = AppContext::new(
        config,
        http,
        tokens,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );
    (ctx, navigator, temp_dir)
}
