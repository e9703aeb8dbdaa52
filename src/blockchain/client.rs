use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

use super::contracts::{
    IAaveOracle, IPool,
    IPoolAddressesProvider::{self, IPoolAddressesProviderInstance},
    IPoolDataProvider::{self, IPoolDataProviderInstance},
    IERC20,
};
use crate::config::{AddressBook, NetworkConfig};
use crate::models::{AccountSnapshot, ReserveConfiguration, SubmissionReceipt, UnsignedTransaction};
use crate::services::reader::{ContractReader, TransactionRelay};
use crate::services::units::{bps_to_fraction, oracle_price_to_usd};

pub type HttpProvider = RootProvider<Http<Client>>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No RPC client configured for network {0}")]
    UnknownNetwork(String),

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("No executor signer configured")]
    SignerUnavailable,
}

fn rpc_error(e: impl std::fmt::Display) -> ChainError {
    ChainError::Rpc(e.to_string())
}

fn contract_error(e: alloy::contract::Error) -> ChainError {
    ChainError::Contract(e.to_string())
}

/// Validate and parse a user-supplied address
pub fn validate_address(address: &str) -> Result<Address, ChainError> {
    let trimmed = address.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(ChainError::InvalidAddress(format!(
            "{} is not a 20-byte hex address",
            address
        )));
    }

    Address::from_str(trimmed)
        .map_err(|e| ChainError::InvalidAddress(format!("Invalid address format: {}", e)))
}

/// Contract handles for one network, bound to its provider once at startup
#[derive(Clone)]
pub struct NetworkContracts {
    rpc_url: Url,
    provider: HttpProvider,
    addresses_provider: IPoolAddressesProviderInstance<Http<Client>, HttpProvider>,
    data_provider: Option<IPoolDataProviderInstance<Http<Client>, HttpProvider>>,
}

impl NetworkContracts {
    pub fn new(network: &NetworkConfig) -> Result<Self, ChainError> {
        let rpc_url: Url = network
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL for {}: {}", network.name, e)))?;
        let provider = ProviderBuilder::new().on_http(rpc_url.clone());

        Ok(Self {
            addresses_provider: IPoolAddressesProvider::new(network.pool_addresses_provider, provider.clone()),
            data_provider: network
                .data_provider
                .map(|address| IPoolDataProvider::new(address, provider.clone())),
            provider,
            rpc_url,
        })
    }
}

/// alloy-backed chain access for every network in the address book
pub struct AlloyChainClient {
    networks: HashMap<String, NetworkContracts>,
    signer: Option<PrivateKeySigner>,
}

impl AlloyChainClient {
    pub fn new(book: &AddressBook, executor_private_key: Option<&str>) -> Result<Self, ChainError> {
        let mut networks = HashMap::new();
        for network in book.networks() {
            networks.insert(network.name.clone(), NetworkContracts::new(network)?);
        }

        let signer = executor_private_key
            .map(|key| key.trim().parse::<PrivateKeySigner>())
            .transpose()
            .map_err(|e| ChainError::InvalidData(format!("Invalid executor private key: {}", e)))?;

        if let Some(signer) = &signer {
            info!(executor = %signer.address(), "Executor signer loaded");
        }

        Ok(Self { networks, signer })
    }

    fn contracts(&self, network: &NetworkConfig) -> Result<&NetworkContracts, ChainError> {
        self.networks
            .get(&network.name)
            .ok_or_else(|| ChainError::UnknownNetwork(network.name.clone()))
    }
}

fn summarize_receipt(receipt: &TransactionReceipt) -> SubmissionReceipt {
    SubmissionReceipt {
        tx_hash: receipt.transaction_hash.to_string(),
        block_number: receipt.block_number,
        gas_used: u128::from(receipt.gas_used),
        effective_gas_price: u128::from(receipt.effective_gas_price),
        success: receipt.status(),
    }
}

#[async_trait]
impl ContractReader for AlloyChainClient {
    async fn pool_address(&self, network: &NetworkConfig) -> Result<Address, ChainError> {
        let contracts = self.contracts(network)?;
        let pool = contracts
            .addresses_provider
            .getPool()
            .call()
            .await
            .map_err(contract_error)?;
        Ok(pool._0)
    }

    async fn account_snapshot(&self, network: &NetworkConfig, user: Address) -> Result<AccountSnapshot, ChainError> {
        let contracts = self.contracts(network)?;
        let pool_address = self.pool_address(network).await?;

        let data = IPool::new(pool_address, contracts.provider.clone())
            .getUserAccountData(user)
            .call()
            .await
            .map_err(contract_error)?;

        debug!(network = %network.name, user = %user, "Fetched account data");

        Ok(AccountSnapshot::from_raw(
            data.totalCollateralBase,
            data.totalDebtBase,
            data.availableBorrowsBase,
            data.currentLiquidationThreshold,
            data.ltv,
            data.healthFactor,
        ))
    }

    async fn asset_price(&self, network: &NetworkConfig, oracle: Address, asset: Address) -> Result<f64, ChainError> {
        let contracts = self.contracts(network)?;
        let price = IAaveOracle::new(oracle, contracts.provider.clone())
            .getAssetPrice(asset)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(oracle_price_to_usd(price._0))
    }

    async fn reserve_configuration(
        &self,
        network: &NetworkConfig,
        asset: Address,
    ) -> Result<ReserveConfiguration, ChainError> {
        let contracts = self.contracts(network)?;
        let data_provider = contracts.data_provider.as_ref().ok_or_else(|| {
            ChainError::InvalidData(format!("No protocol data provider configured for {}", network.name))
        })?;

        let config = data_provider
            .getReserveConfigurationData(asset)
            .call()
            .await
            .map_err(contract_error)?;

        Ok(ReserveConfiguration {
            ltv: bps_to_fraction(config.ltv),
            liquidation_threshold: bps_to_fraction(config.liquidationThreshold),
            borrowing_enabled: config.borrowingEnabled,
            is_active: config.isActive,
        })
    }

    async fn token_balance(&self, network: &NetworkConfig, token: Address, owner: Address) -> Result<U256, ChainError> {
        let contracts = self.contracts(network)?;
        let balance = IERC20::new(token, contracts.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(balance._0)
    }

    async fn allowance(
        &self,
        network: &NetworkConfig,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        let contracts = self.contracts(network)?;
        let allowance = IERC20::new(token, contracts.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(allowance._0)
    }

    async fn transaction_count(&self, network: &NetworkConfig, account: Address) -> Result<u64, ChainError> {
        let contracts = self.contracts(network)?;
        contracts
            .provider
            .get_transaction_count(account)
            .await
            .map_err(rpc_error)
    }

    async fn gas_price(&self, network: &NetworkConfig) -> Result<u128, ChainError> {
        let contracts = self.contracts(network)?;
        contracts.provider.get_gas_price().await.map_err(rpc_error)
    }

    async fn estimate_gas(
        &self,
        network: &NetworkConfig,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<u64, ChainError> {
        let contracts = self.contracts(network)?;
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);

        let gas = contracts
            .provider
            .estimate_gas(&request)
            .await
            .map_err(rpc_error)?;

        u64::try_from(gas).map_err(|_| ChainError::InvalidData("gas estimate out of range".to_string()))
    }
}

#[async_trait]
impl TransactionRelay for AlloyChainClient {
    async fn send_raw_transaction(&self, network: &NetworkConfig, raw: Bytes) -> Result<SubmissionReceipt, ChainError> {
        let contracts = self.contracts(network)?;

        let pending = contracts
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(rpc_error)?;
        let receipt = pending.get_receipt().await.map_err(rpc_error)?;

        Ok(summarize_receipt(&receipt))
    }

    async fn sign_and_send(
        &self,
        network: &NetworkConfig,
        transaction: &UnsignedTransaction,
    ) -> Result<SubmissionReceipt, ChainError> {
        let signer = self.signer.clone().ok_or(ChainError::SignerUnavailable)?;
        let contracts = self.contracts(network)?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(contracts.rpc_url.clone());

        let request = TransactionRequest::default()
            .with_from(transaction.from)
            .with_to(transaction.to)
            .with_input(transaction.data.clone())
            .with_nonce(transaction.nonce)
            .with_chain_id(transaction.chain_id)
            .with_gas_limit(transaction.gas.into())
            .with_value(transaction.value);

        let pending = provider.send_transaction(request).await.map_err(rpc_error)?;
        let receipt = pending.get_receipt().await.map_err(rpc_error)?;

        Ok(summarize_receipt(&receipt))
    }

    fn executor_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }
}
