use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub chain: ChainSettings,
    pub execution: ExecutionSettings,
    pub audit: AuditSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(skip_serializing)]
    pub alchemy_api_key: String,
    pub default_network: String,
    pub mainnet_address_book: String,
    pub testnet_address_book: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    BuildForExternalSigning,
    ExecuteDirectly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    pub mode: ExecutionMode,
    #[serde(skip_serializing)]
    pub executor_private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    pub logger_url: String,
    pub enabled: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub price_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiSettings::default(),
            chain: ChainSettings::default(),
            execution: ExecutionSettings::default(),
            audit: AuditSettings::default(),
            cache: CacheSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        ChainSettings {
            alchemy_api_key: String::new(),
            default_network: "base-sepolia".to_string(),
            mainnet_address_book: "aave-updater/aave_addresses_mainnet.json".to_string(),
            testnet_address_book: "aave-updater/aave_addresses_testnet.json".to_string(),
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        ExecutionSettings {
            mode: ExecutionMode::BuildForExternalSigning,
            executor_private_key: None,
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        AuditSettings {
            logger_url: "http://localhost:3001/test-hedera".to_string(),
            enabled: true,
            timeout_seconds: 5,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings { price_ttl_seconds: 60 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::BuildForExternalSigning => write!(f, "build-for-external-signing"),
            ExecutionMode::ExecuteDirectly => write!(f, "execute-directly"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "build-for-external-signing" | "build" | "unsigned" => Ok(ExecutionMode::BuildForExternalSigning),
            "execute-directly" | "execute" | "executor" => Ok(ExecutionMode::ExecuteDirectly),
            other => Err(format!("unknown execution mode: {}", other)),
        }
    }
}

impl Settings {
    /// Build settings from process environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_config(&source)
    }

    /// Resolve settings from an already-built config source (environment keys are lower-cased)
    pub fn from_config(source: &config::Config) -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();

        let string_or = |key: &str, default: &str| -> String {
            source
                .get_string(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mode = match source.get_string("execution_mode") {
            Ok(raw) => raw.parse::<ExecutionMode>().map_err(config::ConfigError::Message)?,
            Err(_) => defaults.execution.mode,
        };
        let executor_private_key = source
            .get_string("executor_private_key")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if mode == ExecutionMode::ExecuteDirectly && executor_private_key.is_none() {
            return Err(config::ConfigError::Message(
                "EXECUTION_MODE=execute-directly requires EXECUTOR_PRIVATE_KEY".to_string(),
            ));
        }

        let default_network = source
            .get_string("network")
            .or_else(|_| source.get_string("default_network"))
            .unwrap_or(defaults.chain.default_network)
            .to_lowercase();

        Ok(Settings {
            api: ApiSettings {
                host: string_or("api_host", &defaults.api.host),
                port: source.get_int("api_port").ok().and_then(|p| u16::try_from(p).ok()).unwrap_or(defaults.api.port),
            },
            chain: ChainSettings {
                alchemy_api_key: string_or("alchemy_api_key", ""),
                default_network,
                mainnet_address_book: string_or("aave_addresses_mainnet", &defaults.chain.mainnet_address_book),
                testnet_address_book: string_or("aave_addresses_testnet", &defaults.chain.testnet_address_book),
            },
            execution: ExecutionSettings {
                mode,
                executor_private_key,
            },
            audit: AuditSettings {
                logger_url: string_or("hedera_logger_url", &defaults.audit.logger_url),
                enabled: source.get_bool("audit_log_enabled").unwrap_or(defaults.audit.enabled),
                timeout_seconds: source
                    .get_int("audit_log_timeout_seconds")
                    .ok()
                    .and_then(|t| u64::try_from(t).ok())
                    .unwrap_or(defaults.audit.timeout_seconds),
            },
            cache: CacheSettings {
                price_ttl_seconds: source
                    .get_int("price_cache_ttl_seconds")
                    .ok()
                    .and_then(|t| u64::try_from(t).ok())
                    .unwrap_or(defaults.cache.price_ttl_seconds),
            },
            logging: LoggingSettings {
                level: string_or("log_level", &defaults.logging.level),
                format: string_or("log_format", &defaults.logging.format),
            },
        })
    }
}
