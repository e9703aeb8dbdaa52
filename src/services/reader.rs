// Chain access seams; the alloy client implements both, tests substitute mocks
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::blockchain::ChainError;
use crate::config::NetworkConfig;
use crate::models::{AccountSnapshot, ReserveConfiguration, SubmissionReceipt, UnsignedTransaction};

#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Pool proxy address resolved through the network's PoolAddressesProvider
    async fn pool_address(&self, network: &NetworkConfig) -> Result<Address, ChainError>;

    async fn account_snapshot(&self, network: &NetworkConfig, user: Address) -> Result<AccountSnapshot, ChainError>;

    /// USD price of `asset` from `oracle`
    async fn asset_price(&self, network: &NetworkConfig, oracle: Address, asset: Address) -> Result<f64, ChainError>;

    async fn reserve_configuration(
        &self,
        network: &NetworkConfig,
        asset: Address,
    ) -> Result<ReserveConfiguration, ChainError>;

    async fn token_balance(&self, network: &NetworkConfig, token: Address, owner: Address) -> Result<U256, ChainError>;

    async fn allowance(
        &self,
        network: &NetworkConfig,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError>;

    async fn transaction_count(&self, network: &NetworkConfig, account: Address) -> Result<u64, ChainError>;

    /// Current gas price in wei
    async fn gas_price(&self, network: &NetworkConfig) -> Result<u128, ChainError>;

    async fn estimate_gas(
        &self,
        network: &NetworkConfig,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<u64, ChainError>;
}

#[async_trait]
pub trait TransactionRelay: Send + Sync {
    /// Broadcast a transaction the caller already signed and wait for its receipt
    async fn send_raw_transaction(&self, network: &NetworkConfig, raw: Bytes) -> Result<SubmissionReceipt, ChainError>;

    /// Sign with the executor key, broadcast and wait for the receipt
    async fn sign_and_send(
        &self,
        network: &NetworkConfig,
        transaction: &UnsignedTransaction,
    ) -> Result<SubmissionReceipt, ChainError>;

    fn executor_address(&self) -> Option<Address>;
}
