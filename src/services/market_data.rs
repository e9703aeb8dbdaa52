// Per-network reserve prices and risk parameters, cached with static fallbacks
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{AssetConfig, NetworkConfig};
use crate::models::{AssetMarketData, MarketDataSource, MarketSnapshot};
use crate::services::price_cache::{CachedSnapshot, PriceCache};
use crate::services::reader::ContractReader;

/// Oracle answers above this are treated as corrupt
const MAX_SANE_PRICE_USD: f64 = 1_000_000.0;

/// Approximate USD price used when the oracle cannot be read
pub fn fallback_price(symbol: &str) -> f64 {
    match symbol.to_uppercase().as_str() {
        "USDC" | "USDT" | "DAI" => 1.0,
        "WETH" => 2000.0,
        "WBTC" => 50000.0,
        "LINK" => 15.0,
        "CBETH" => 3000.0,
        _ => 1.0,
    }
}

/// Approximate liquidation threshold used when reserve configuration cannot be read
pub fn fallback_liquidation_threshold(symbol: &str) -> f64 {
    match symbol.to_uppercase().as_str() {
        "USDC" | "USDT" | "DAI" => 0.90,
        "WETH" | "WBTC" | "CBETH" => 0.85,
        "LINK" => 0.80,
        _ => 0.80,
    }
}

fn sane_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0 && price <= MAX_SANE_PRICE_USD).then_some(price)
}

pub struct MarketDataService {
    reader: Arc<dyn ContractReader>,
    cache: PriceCache,
}

impl MarketDataService {
    pub fn new(reader: Arc<dyn ContractReader>, cache: PriceCache) -> Self {
        Self { reader, cache }
    }

    /// Cached snapshot for the network, refetched once the entry has expired
    pub async fn snapshot(&self, network: &NetworkConfig) -> CachedSnapshot {
        if let Some(cached) = self.cache.get(&network.name).await {
            debug!(network = %network.name, "Market data cache hit");
            return cached;
        }

        let snapshot = self.fetch_snapshot(network).await;
        let live_reads = snapshot
            .prices
            .values()
            .filter(|data| data.price_source == MarketDataSource::Oracle)
            .count();

        if live_reads == 0 && !snapshot.prices.is_empty() {
            warn!(network = %network.name, "No live oracle reads, caching fallback market data");
        }

        info!(
            network = %network.name,
            assets = snapshot.prices.len(),
            live_reads,
            "Refreshed market data"
        );
        self.cache.insert(&network.name, snapshot).await
    }

    /// Market data for one reserve, taken from the cached network snapshot
    pub async fn asset(&self, network: &NetworkConfig, asset: &AssetConfig) -> AssetMarketData {
        let cached = self.snapshot(network).await;
        match cached.snapshot.asset(&asset.symbol) {
            Some(data) => data.clone(),
            None => self.fetch_asset(network, asset).await,
        }
    }

    pub async fn fetch_snapshot(&self, network: &NetworkConfig) -> MarketSnapshot {
        let reads = network
            .assets
            .values()
            .map(|asset| async move { (asset.symbol.clone(), self.fetch_asset(network, asset).await) });

        let prices: BTreeMap<String, AssetMarketData> = join_all(reads).await.into_iter().collect();

        MarketSnapshot {
            network: network.name.clone(),
            timestamp: Utc::now(),
            oracle_address: network.oracle.map(|a| a.to_checksum(None)),
            prices,
        }
    }

    async fn fetch_asset(&self, network: &NetworkConfig, asset: &AssetConfig) -> AssetMarketData {
        let oracle = asset.oracle.or(network.oracle);

        let price = match oracle {
            Some(oracle) => match self.reader.asset_price(network, oracle, asset.underlying).await {
                Ok(price) => {
                    let checked = sane_price(price);
                    if checked.is_none() {
                        warn!(network = %network.name, token = %asset.symbol, price, "Oracle returned implausible price");
                    }
                    checked
                }
                Err(e) => {
                    warn!(network = %network.name, token = %asset.symbol, error = %e, "Oracle price read failed");
                    None
                }
            },
            None => {
                warn!(network = %network.name, token = %asset.symbol, "No oracle configured");
                None
            }
        };

        let configuration = if network.data_provider.is_some() {
            match self.reader.reserve_configuration(network, asset.underlying).await {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(network = %network.name, token = %asset.symbol, error = %e, "Reserve configuration read failed");
                    None
                }
            }
        } else {
            None
        };

        let (price_usd, price_source) = match price {
            Some(price) => (price, MarketDataSource::Oracle),
            None => (fallback_price(&asset.symbol), MarketDataSource::Fallback),
        };

        match configuration {
            Some(config) => AssetMarketData {
                price_usd,
                ltv: config.ltv,
                liquidation_threshold: config.liquidation_threshold,
                is_active: config.is_active,
                borrowing_enabled: config.borrowing_enabled,
                oracle_address: oracle.map(|a| a.to_checksum(None)),
                price_source,
                config_source: MarketDataSource::Oracle,
            },
            None => AssetMarketData {
                price_usd,
                ltv: 0.0,
                liquidation_threshold: fallback_liquidation_threshold(&asset.symbol),
                is_active: true,
                borrowing_enabled: true,
                oracle_address: oracle.map(|a| a.to_checksum(None)),
                price_source,
                config_source: MarketDataSource::Fallback,
            },
        }
    }
}
