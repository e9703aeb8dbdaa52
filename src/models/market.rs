use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketDataSource {
    Oracle,
    Fallback,
}

/// Price and risk parameters for one reserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMarketData {
    pub price_usd: f64,
    pub ltv: f64,
    pub liquidation_threshold: f64,
    pub is_active: bool,
    pub borrowing_enabled: bool,
    pub oracle_address: Option<String>,
    pub price_source: MarketDataSource,
    pub config_source: MarketDataSource,
}

/// Decoded `getReserveConfigurationData`, percentages already converted from basis points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveConfiguration {
    pub ltv: f64,
    pub liquidation_threshold: f64,
    pub borrowing_enabled: bool,
    pub is_active: bool,
}

/// Every configured reserve of a network as read at `timestamp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub network: String,
    pub timestamp: DateTime<Utc>,
    pub oracle_address: Option<String>,
    pub prices: BTreeMap<String, AssetMarketData>,
}

impl MarketSnapshot {
    pub fn asset(&self, symbol: &str) -> Option<&AssetMarketData> {
        let wanted = symbol.to_uppercase();
        self.prices
            .iter()
            .find(|(configured, _)| configured.to_uppercase() == wanted)
            .map(|(_, data)| data)
    }
}
