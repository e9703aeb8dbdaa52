// Aave V3 network address book: loading, name normalisation and RPC routing
use alloy::primitives::{address, Address};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Placeholder address Aave uses for the chain's native asset
pub const NATIVE_ASSET_PLACEHOLDER: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

const FALLBACK_ADDRESS_BOOK: &str = include_str!("fallback_addresses.json");

/// Chains whose address-book names already carry their own suffix rules
const WELL_KNOWN_CHAIN_IDS: [u64; 13] = [
    1, 84532, 421614, 11155111, 42161, 11155420, 534351, 534352, 43113, 43114, 137, 10, 80001,
];

#[derive(Debug, thiserror::Error)]
pub enum NetworkConfigError {
    #[error("Failed to read address book {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse address book: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid address {value} for {field}")]
    InvalidAddress { field: String, value: String },

    #[error("Address book contains no usable networks")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub symbol: String,
    pub underlying: Address,
    pub a_token: Option<Address>,
    pub v_token: Option<Address>,
    pub oracle: Option<Address>,
    pub decimals: u8,
}

impl AssetConfig {
    pub fn is_native(&self) -> bool {
        self.underlying == NATIVE_ASSET_PLACEHOLDER
    }
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub raw_name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub pool_addresses_provider: Address,
    pub data_provider: Option<Address>,
    pub oracle: Option<Address>,
    pub assets: BTreeMap<String, AssetConfig>,
}

impl NetworkConfig {
    /// Look up a configured asset, ignoring case of the requested symbol
    pub fn asset(&self, symbol: &str) -> Option<&AssetConfig> {
        let wanted = symbol.trim().to_uppercase();
        self.assets
            .iter()
            .find(|(configured, _)| configured.to_uppercase() == wanted)
            .map(|(_, asset)| asset)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawNetwork {
    #[serde(rename = "CHAIN_ID")]
    chain_id: Option<u64>,
    #[serde(rename = "POOL_ADDRESSES_PROVIDER")]
    pool_addresses_provider: Option<String>,
    #[serde(rename = "AAVE_PROTOCOL_DATA_PROVIDER")]
    data_provider: Option<String>,
    #[serde(rename = "ORACLE")]
    oracle: Option<String>,
    #[serde(rename = "ASSETS")]
    assets: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    #[serde(rename = "UNDERLYING")]
    underlying: Option<String>,
    #[serde(rename = "A_TOKEN")]
    a_token: Option<String>,
    #[serde(rename = "V_TOKEN")]
    v_token: Option<String>,
    #[serde(rename = "ORACLE")]
    oracle: Option<String>,
    decimals: Option<u8>,
}

/// All networks the gateway can serve, keyed by normalised name
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    networks: BTreeMap<String, NetworkConfig>,
}

impl AddressBook {
    /// Load mainnet and testnet books, falling back to the built-in book on any failure
    pub fn load(mainnet_path: &Path, testnet_path: &Path, api_key: &str) -> Result<Self, NetworkConfigError> {
        match Self::from_files(mainnet_path, testnet_path, api_key) {
            Ok(book) => {
                info!(networks = book.len(), "Loaded Aave address books");
                Ok(book)
            }
            Err(e) => {
                warn!(error = %e, "Could not load address books, using built-in fallback networks");
                Self::fallback(api_key)
            }
        }
    }

    pub fn from_files(mainnet_path: &Path, testnet_path: &Path, api_key: &str) -> Result<Self, NetworkConfigError> {
        let mainnet = read_book(mainnet_path)?;
        let testnet = read_book(testnet_path)?;

        let mut merged = mainnet;
        merged.extend(testnet);

        Self::from_entries(merged, api_key)
    }

    pub fn fallback(api_key: &str) -> Result<Self, NetworkConfigError> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(FALLBACK_ADDRESS_BOOK)?;
        Self::from_entries(entries, api_key)
    }

    pub fn from_entries(entries: BTreeMap<String, Value>, api_key: &str) -> Result<Self, NetworkConfigError> {
        let mut networks = BTreeMap::new();

        for (raw_name, value) in entries {
            let raw: RawNetwork = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(_) => continue,
            };

            match build_network(&raw_name, raw, api_key) {
                Ok(Some(network)) => {
                    networks.insert(network.name.clone(), network);
                }
                Ok(None) => {}
                Err(e) => warn!(network = %raw_name, error = %e, "Skipping invalid network entry"),
            }
        }

        if networks.is_empty() {
            return Err(NetworkConfigError::Empty);
        }

        Ok(Self { networks })
    }

    pub fn get(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(&name.trim().to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        self.networks.keys().cloned().collect()
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.values()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

fn read_book(path: &Path) -> Result<BTreeMap<String, Value>, NetworkConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| NetworkConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(serde_json::from_str(&contents)?)
}

fn build_network(raw_name: &str, raw: RawNetwork, api_key: &str) -> Result<Option<NetworkConfig>, NetworkConfigError> {
    let (Some(provider), Some(asset_values)) = (raw.pool_addresses_provider, raw.assets) else {
        return Ok(None);
    };
    let Some(chain_id) = raw.chain_id else {
        return Ok(None);
    };

    let mut assets = BTreeMap::new();
    for (symbol, value) in asset_values {
        let Ok(asset) = serde_json::from_value::<RawAsset>(value) else {
            continue;
        };
        let Some(underlying) = asset.underlying else {
            continue;
        };

        assets.insert(
            symbol.clone(),
            AssetConfig {
                underlying: parse_address(&format!("{}.UNDERLYING", symbol), &underlying)?,
                a_token: parse_optional(&format!("{}.A_TOKEN", symbol), asset.a_token)?,
                v_token: parse_optional(&format!("{}.V_TOKEN", symbol), asset.v_token)?,
                oracle: parse_optional(&format!("{}.ORACLE", symbol), asset.oracle)?,
                decimals: asset.decimals.unwrap_or(18),
                symbol,
            },
        );
    }

    if assets.is_empty() {
        return Ok(None);
    }

    Ok(Some(NetworkConfig {
        name: normalize_network_name(raw_name, chain_id),
        raw_name: raw_name.to_string(),
        chain_id,
        rpc_url: rpc_url_for_chain(chain_id, api_key),
        pool_addresses_provider: parse_address("POOL_ADDRESSES_PROVIDER", &provider)?,
        data_provider: parse_optional("AAVE_PROTOCOL_DATA_PROVIDER", raw.data_provider)?,
        oracle: parse_optional("ORACLE", raw.oracle)?,
        assets,
    }))
}

fn parse_address(field: &str, value: &str) -> Result<Address, NetworkConfigError> {
    Address::from_str(value.trim()).map_err(|_| NetworkConfigError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_optional(field: &str, value: Option<String>) -> Result<Option<Address>, NetworkConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_address(field, &v).map(Some),
        _ => Ok(None),
    }
}

/// Turn an address-book key such as `AaveV3BaseSepolia` into a route name such as `base-sepolia`
pub fn normalize_network_name(raw_name: &str, chain_id: u64) -> String {
    let mut name = raw_name.to_lowercase().replace("aavev3", "");

    name = match name.as_str() {
        "ethereum" => "eth-mainnet".to_string(),
        "ethereumhorizon" => "eth-horizon".to_string(),
        "ethereumetherfi" => "eth-etherfi".to_string(),
        "ethereumlido" => "eth-lido".to_string(),
        "arbitrum" => "arbitrum-mainnet".to_string(),
        "avalanche" => "avalanche-mainnet".to_string(),
        "optimism" => "optimism-mainnet".to_string(),
        "scroll" => "scroll-mainnet".to_string(),
        "fuji" => "avalanche-fuji".to_string(),
        _ => name,
    };

    if name.contains("sepolia") {
        name = if name == "sepolia" {
            "eth-sepolia".to_string()
        } else {
            name.replace("sepolia", "-sepolia")
        };
    }

    if !name.is_empty() && !name.ends_with("-mainnet") && !name.ends_with("-sepolia") {
        if chain_id == 1 {
            name = name.replace("ethereum", "");
            if name.is_empty() {
                name = "eth-mainnet".to_string();
            }
        } else if !WELL_KNOWN_CHAIN_IDS.contains(&chain_id) {
            name.push_str("-mainnet");
        }
    }

    name
}

/// Alchemy subdomain for a chain id; unknown chains route to Ethereum mainnet
pub fn alchemy_slug(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "eth-mainnet",
        11155111 => "eth-sepolia",
        84532 => "base-sepolia",
        8453 => "base-mainnet",
        42161 => "arb-mainnet",
        421614 => "arb-sepolia",
        137 => "polygon-mainnet",
        80001 => "polygon-amoy",
        10 => "opt-mainnet",
        11155420 => "opt-sepolia",
        43114 => "avax-mainnet",
        43113 => "avax-fuji",
        534351 => "scroll-sepolia",
        534352 => "scroll-mainnet",
        56 => "bnb-mainnet",
        42220 => "celo-mainnet",
        100 => "gnosis-mainnet",
        1088 => "metis-mainnet",
        146 => "sonic-mainnet",
        324 => "zksync-mainnet",
        59144 => "linea-mainnet",
        _ => "eth-mainnet",
    }
}

pub fn rpc_url_for_chain(chain_id: u64, api_key: &str) -> String {
    format!("https://{}.g.alchemy.com/v2/{}", alchemy_slug(chain_id), api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_normalize_network_names() {
        assert_eq!(normalize_network_name("AaveV3BaseSepolia", 84532), "base-sepolia");
        assert_eq!(normalize_network_name("AaveV3Sepolia", 11155111), "eth-sepolia");
        assert_eq!(normalize_network_name("AaveV3Ethereum", 1), "eth-mainnet");
        assert_eq!(normalize_network_name("AaveV3EthereumLido", 1), "eth-lido");
        assert_eq!(normalize_network_name("AaveV3Arbitrum", 42161), "arbitrum-mainnet");
        assert_eq!(normalize_network_name("AaveV3ArbitrumSepolia", 421614), "arbitrum-sepolia");
        assert_eq!(normalize_network_name("AaveV3Fuji", 43113), "avalanche-fuji");
        assert_eq!(normalize_network_name("AaveV3Base", 8453), "base-mainnet");
        assert_eq!(normalize_network_name("AaveV3Polygon", 137), "polygon");
    }

    #[test]
    fn test_rpc_url_uses_chain_slug() {
        assert_eq!(
            rpc_url_for_chain(84532, "key"),
            "https://base-sepolia.g.alchemy.com/v2/key"
        );
        assert_eq!(rpc_url_for_chain(999_999, "key"), "https://eth-mainnet.g.alchemy.com/v2/key");
    }

    #[test]
    fn test_fallback_book_has_testnets() {
        let book = AddressBook::fallback("key").unwrap();
        let base = book.get("base-sepolia").unwrap();
        assert_eq!(base.chain_id, 84532);
        assert_eq!(base.asset("usdc").unwrap().decimals, 6);
        assert!(base.asset("cbeth").is_some());
        assert!(base.asset("USDC").unwrap().oracle.is_some());

        let sepolia = book.get("eth-sepolia").unwrap();
        assert_eq!(sepolia.asset("EURS").unwrap().decimals, 2);
        assert_eq!(sepolia.asset("WBTC").unwrap().decimals, 8);
        assert!(sepolia.asset("WBTC").unwrap().oracle.is_none());
    }

    #[test]
    fn test_entries_without_assets_are_skipped() {
        let mut entries = BTreeMap::new();
        entries.insert("AaveV3Empty".to_string(), json!({"CHAIN_ID": 8453}));
        entries.insert("Metadata".to_string(), json!("not a network"));
        entries.insert(
            "AaveV3Base".to_string(),
            json!({
                "CHAIN_ID": 8453,
                "POOL_ADDRESSES_PROVIDER": "0xe20fCBdBfFC4Dd138cE8b2E6FBb6CB49777ad64D",
                "ASSETS": {
                    "WETH": {"UNDERLYING": "0x4200000000000000000000000000000000000006"},
                    "BROKEN": {"A_TOKEN": "0x4200000000000000000000000000000000000006"}
                }
            }),
        );

        let book = AddressBook::from_entries(entries, "key").unwrap();
        assert_eq!(book.names(), vec!["base-mainnet".to_string()]);
        let weth = book.get("base-mainnet").unwrap().asset("weth").unwrap();
        assert_eq!(weth.decimals, 18);
        assert!(weth.a_token.is_none());
    }

    #[test]
    fn test_load_falls_back_when_files_missing() {
        let book = AddressBook::load(Path::new("/nonexistent/a.json"), Path::new("/nonexistent/b.json"), "k").unwrap();
        assert!(book.get("base-sepolia").is_some());
    }

    #[test]
    fn test_load_merges_mainnet_and_testnet_files() {
        let mut mainnet = tempfile::NamedTempFile::new().unwrap();
        let mut testnet = tempfile::NamedTempFile::new().unwrap();
        write!(
            mainnet,
            "{}",
            json!({"AaveV3Base": {
                "CHAIN_ID": 8453,
                "POOL_ADDRESSES_PROVIDER": "0xe20fCBdBfFC4Dd138cE8b2E6FBb6CB49777ad64D",
                "ASSETS": {"USDC": {"UNDERLYING": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", "decimals": 6}}
            }})
        )
        .unwrap();
        write!(testnet, "{}", FALLBACK_ADDRESS_BOOK).unwrap();

        let book = AddressBook::from_files(mainnet.path(), testnet.path(), "k").unwrap();
        assert_eq!(book.len(), 3);
        assert!(book.get("BASE-MAINNET").is_some());
    }

    #[test]
    fn test_native_placeholder_detection() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "AaveV3BaseSepolia".to_string(),
            json!({
                "CHAIN_ID": 84532,
                "POOL_ADDRESSES_PROVIDER": "0xE4C23309117Aa30342BFaae6c95c6478e0A4Ad00",
                "ASSETS": {
                    "ETH": {"UNDERLYING": "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"},
                    "WETH": {"UNDERLYING": "0x4200000000000000000000000000000000000006"}
                }
            }),
        );

        let book = AddressBook::from_entries(entries, "key").unwrap();
        let network = book.get("base-sepolia").unwrap();
        assert!(network.asset("eth").unwrap().is_native());
        assert!(!network.asset("weth").unwrap().is_native());
        assert_eq!(
            NATIVE_ASSET_PLACEHOLDER.to_checksum(None),
            "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"
        );
    }
}
