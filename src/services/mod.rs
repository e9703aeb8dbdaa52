pub mod audit_service;
pub mod executor;
pub mod market_data;
pub mod price_cache;
pub mod reader;
pub mod simulator;
pub mod tx_builder;
pub mod units;

pub use audit_service::{AuditEvent, AuditEventType, AuditLogger};
pub use executor::{ActionExecutor, ExecutionOutcome};
pub use market_data::MarketDataService;
pub use price_cache::{CacheConfig, PriceCache};
pub use reader::{ContractReader, TransactionRelay};
pub use tx_builder::{PoolOperation, TransactionBuilder};
