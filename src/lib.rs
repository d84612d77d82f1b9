//! inventory-console - client for the feed store inventory & pricing tracker
//!
//! This crate provides the client side of a small inventory/pricing tool:
//! - Typed REST client with bearer auth and uniform error normalization
//! - PIN-based session state, initialized lazily once per lifetime
//! - redb-backed credential store (survives restarts)
//! - In-memory inventory cache with keyed in-place patching
//! - Route guard over the console's surfaces
//! - Static product-group catalog for the printed price sheet

pub mod api;
pub mod catalog;
pub mod config;
pub mod inventory;
pub mod routes;
pub mod session;
pub mod store;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use api::ApiClient;
use config::Config;
use inventory::InventoryCache;
use routes::{Navigator, Route, RouteDecision};
use session::SessionState;
use store::TokenStore;

/// Shared application state.
///
/// One explicit context instead of ambient singletons: the routing layer
/// and the data layer both borrow from here, and tests build as many
/// isolated contexts as they need.
pub struct AppContext {
    pub api: ApiClient,
    pub config: Config,
    pub inventory: InventoryCache,
    pub session: SessionState,
    pub tokens: Arc<TokenStore>,
}

impl AppContext {
    /// Wire the client stack around one store, HTTP client and navigator.
    pub fn new(
        config: Config,
        http: reqwest::Client,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let api = ApiClient::new(
            config.api_base_url.clone(),
            http,
            Arc::clone(&tokens),
            navigator,
        );
        Self {
            api,
            config,
            inventory: InventoryCache::new(),
            session: SessionState::new(),
            tokens,
        }
    }

    /// Gate a navigation against the current session.
    pub async fn guard(&self, target: Route) -> RouteDecision {
        routes::guard(&self.session, &self.api, &self.tokens, target).await
    }
}
