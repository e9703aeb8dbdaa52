pub mod blockchain;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use error::types::*;

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AddressBook, AssetConfig, NetworkConfig, Settings};
use crate::services::{
    ActionExecutor, AuditLogger, CacheConfig, ContractReader, MarketDataService, PriceCache, TransactionRelay,
};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub networks: Arc<AddressBook>,
    pub reader: Arc<dyn ContractReader>,
    pub relay: Arc<dyn TransactionRelay>,
    pub market_data: Arc<MarketDataService>,
    pub executor: Arc<ActionExecutor>,
    pub audit: AuditLogger,
}

impl AppState {
    pub fn new(
        settings: Settings,
        networks: AddressBook,
        reader: Arc<dyn ContractReader>,
        relay: Arc<dyn TransactionRelay>,
    ) -> Self {
        let cache = PriceCache::new(CacheConfig::with_ttl(Duration::from_secs(settings.cache.price_ttl_seconds)));
        let market_data = Arc::new(MarketDataService::new(reader.clone(), cache));
        let executor = Arc::new(ActionExecutor::new(settings.execution.mode, reader.clone(), relay.clone()));
        let audit = AuditLogger::new(&settings.audit);

        Self {
            settings: Arc::new(settings),
            networks: Arc::new(networks),
            reader,
            relay,
            market_data,
            executor,
            audit,
        }
    }

    /// Resolve a requested network name, using the configured default when absent
    pub fn network(&self, requested: Option<&str>) -> Result<&NetworkConfig, AppError> {
        let name = requested
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.settings.chain.default_network);

        self.networks
            .get(name)
            .ok_or_else(|| AppError::UnsupportedNetwork(name.to_string()))
    }

    pub fn asset<'a>(&self, network: &'a NetworkConfig, token: &str) -> Result<&'a AssetConfig, AppError> {
        network.asset(token).ok_or_else(|| AppError::UnsupportedAsset {
            token: token.to_uppercase(),
            network: network.name.clone(),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::create_health_routes())
        .merge(handlers::create_account_routes())
        .merge(handlers::create_price_routes())
        .merge(handlers::create_lending_routes())
        .merge(handlers::create_simulation_routes())
        .merge(handlers::create_transaction_routes())
        .merge(handlers::create_manifest_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
