use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::models::MarketSnapshot;

/// Cache sizing for market snapshots
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 256,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, ..Self::default() }
    }
}

#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub snapshot: Arc<MarketSnapshot>,
    pub expires_at: DateTime<Utc>,
}

/// Per-network market snapshots, evicted purely by age
#[derive(Clone)]
pub struct PriceCache {
    entries: Cache<String, CachedSnapshot>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            entries,
            ttl: config.ttl,
        }
    }

    pub async fn get(&self, network: &str) -> Option<CachedSnapshot> {
        self.entries.get(network).await
    }

    pub async fn insert(&self, network: &str, snapshot: MarketSnapshot) -> CachedSnapshot {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(60));
        let entry = CachedSnapshot {
            expires_at: snapshot.timestamp + ttl,
            snapshot: Arc::new(snapshot),
        };
        self.entries.insert(network.to_string(), entry.clone()).await;
        entry
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
