use tokio::sync::RwLock;

use crate::api::models::{ChangeType, InventoryAdjustment, LogEntry, Product};
use crate::api::{ApiClient, ClientError};

#[derive(Debug, Default)]
struct CacheState {
    error: Option<String>,
    loading: bool,
    log_entries: Vec<LogEntry>,
    products: Vec<Product>,
}

/// In-memory mirror of the server-side product and log collections.
///
/// Collections change only on successful responses: fetches replace them
/// wholesale, mutations patch the single matching entry in place. Nothing
/// is inserted speculatively, and a failed fetch leaves the previous data
/// untouched.
///
/// The `loading`/`error` flags are per operation class, not per request —
/// overlapping fetches clobber each other's flags. Known and accepted at
/// this scale.
pub struct InventoryCache {
    state: RwLock<CacheState>,
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
        }
    }

    // ========================================================================
    // Read accessors & derived views
    // ========================================================================

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.state.read().await.log_entries.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Products at or below their reorder point, in cache order.
    pub async fn low_stock(&self) -> Vec<Product> {
        self.state
            .read()
            .await
            .products
            .iter()
            .filter(|p| p.qty_on_hand <= p.reorder_point)
            .cloned()
            .collect()
    }

    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    pub async fn low_stock_count(&self) -> usize {
        self.low_stock().await.len()
    }

    // ========================================================================
    // Fetches (full replace; failures become a local error string)
    // ========================================================================

    pub async fn fetch_products(&self, api: &ApiClient) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = api.get_products().await;

        let mut state = self.state.write().await;
        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Refreshed product cache");
                state.products = products;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Product fetch failed");
                state.error = Some(e.to_string());
            }
        }
        state.loading = false;
    }

    pub async fn fetch_log(&self, api: &ApiClient, limit: u32) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = api.get_log(limit).await;

        let mut state = self.state.write().await;
        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Refreshed inventory log");
                state.log_entries = entries;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Inventory log fetch failed");
                state.error = Some(e.to_string());
            }
        }
        state.loading = false;
    }

    // ========================================================================
    // Mutations (patch one entry on success; failures propagate)
    // ========================================================================

    pub async fn adjust_inventory(
        &self,
        api: &ApiClient,
        material_no: &str,
        change_type: ChangeType,
        quantity: i64,
        notes: &str,
    ) -> Result<Product, ClientError> {
        let adjustment = InventoryAdjustment {
            change_type,
            material_no: material_no.to_string(),
            notes: notes.to_string(),
            quantity,
        };
        let updated = api.adjust_inventory(&adjustment).await?;
        self.patch(&updated).await;
        Ok(updated)
    }

    pub async fn update_markup(
        &self,
        api: &ApiClient,
        material_no: &str,
        markup_pct: f64,
    ) -> Result<Product, ClientError> {
        let updated = api.update_markup(material_no, markup_pct).await?;
        self.patch(&updated).await;
        Ok(updated)
    }

    pub async fn update_reorder(
        &self,
        api: &ApiClient,
        material_no: &str,
        reorder_point: i64,
    ) -> Result<Product, ClientError> {
        let updated = api.update_reorder(material_no, reorder_point).await?;
        self.patch(&updated).await;
        Ok(updated)
    }

    /// One request, many patches — each returned product lands on its own
    /// cached entry.
    pub async fn bulk_adjust(
        &self,
        api: &ApiClient,
        adjustments: Vec<InventoryAdjustment>,
    ) -> Result<Vec<Product>, ClientError> {
        let updated = api.bulk_adjust(adjustments).await?;
        let mut state = self.state.write().await;
        for product in &updated {
            patch_in(&mut state.products, product);
        }
        Ok(updated)
    }

    async fn patch(&self, updated: &Product) {
        let mut state = self.state.write().await;
        patch_in(&mut state.products, updated);
    }
}

/// Replace the entry matching the response's material number, in place.
/// Responses for products the cache never saw are dropped, not inserted.
fn patch_in(products: &mut Vec<Product>, updated: &Product) {
    match products
        .iter_mut()
        .find(|p| p.material_no == updated.material_no)
    {
        Some(existing) => *existing = updated.clone(),
        None => {
            tracing::debug!(material_no = %updated.material_no, "Mutation response for uncached product dropped");
        }
    }
}
