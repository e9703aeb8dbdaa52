// Unsigned Aave pool transactions, with an ERC-20 approval when allowance is short
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::blockchain::contracts::{IPool, IERC20};
use crate::blockchain::ChainError;
use crate::config::{AssetConfig, NetworkConfig};
use crate::models::UnsignedTransaction;
use crate::services::reader::ContractReader;
use crate::services::units::wei_to_native;

pub const APPROVAL_GAS_LIMIT: u64 = 50_000;
pub const SUPPLY_GAS_LIMIT: u64 = 300_000;
pub const BORROW_GAS_LIMIT: u64 = 400_000;
pub const REPAY_GAS_LIMIT: u64 = 350_000;

/// Aave interest rate mode 2: variable
pub const VARIABLE_RATE_MODE: u64 = 2;
pub const REFERRAL_CODE: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOperation {
    Supply,
    Borrow,
    Repay,
}

impl PoolOperation {
    pub fn gas_limit(&self) -> u64 {
        match self {
            PoolOperation::Supply => SUPPLY_GAS_LIMIT,
            PoolOperation::Borrow => BORROW_GAS_LIMIT,
            PoolOperation::Repay => REPAY_GAS_LIMIT,
        }
    }

    /// Whether the pool pulls tokens from the sender
    pub fn transfers_from_sender(&self) -> bool {
        matches!(self, PoolOperation::Supply | PoolOperation::Repay)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolOperation::Supply => "supply",
            PoolOperation::Borrow => "borrow",
            PoolOperation::Repay => "repay",
        }
    }
}

pub fn supply_calldata(asset: Address, amount: U256, on_behalf_of: Address) -> Bytes {
    IPool::supplyCall {
        asset,
        amount,
        onBehalfOf: on_behalf_of,
        referralCode: REFERRAL_CODE,
    }
    .abi_encode()
    .into()
}

pub fn borrow_calldata(asset: Address, amount: U256, on_behalf_of: Address) -> Bytes {
    IPool::borrowCall {
        asset,
        amount,
        interestRateMode: U256::from(VARIABLE_RATE_MODE),
        referralCode: REFERRAL_CODE,
        onBehalfOf: on_behalf_of,
    }
    .abi_encode()
    .into()
}

pub fn repay_calldata(asset: Address, amount: U256, on_behalf_of: Address) -> Bytes {
    IPool::repayCall {
        asset,
        amount,
        interestRateMode: U256::from(VARIABLE_RATE_MODE),
        onBehalfOf: on_behalf_of,
    }
    .abi_encode()
    .into()
}

pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn operation_calldata(operation: PoolOperation, asset: Address, amount: U256, on_behalf_of: Address) -> Bytes {
    match operation {
        PoolOperation::Supply => supply_calldata(asset, amount, on_behalf_of),
        PoolOperation::Borrow => borrow_calldata(asset, amount, on_behalf_of),
        PoolOperation::Repay => repay_calldata(asset, amount, on_behalf_of),
    }
}

/// Who signs the transaction and whose position it acts on
#[derive(Debug, Clone, Copy)]
pub struct Participants {
    pub sender: Address,
    pub on_behalf_of: Address,
}

#[derive(Debug, Clone)]
pub struct PreparedTransactions {
    pub approval: Option<UnsignedTransaction>,
    pub main: UnsignedTransaction,
    pub gas_price_wei: u128,
}

impl PreparedTransactions {
    pub fn total_gas(&self) -> u64 {
        self.main.gas + self.approval.as_ref().map(|tx| tx.gas).unwrap_or(0)
    }

    /// Native-token cost at the gas price seen when building
    pub fn gas_cost(&self) -> f64 {
        wei_to_native(u128::from(self.total_gas()).saturating_mul(self.gas_price_wei))
    }
}

pub struct TransactionBuilder {
    reader: Arc<dyn ContractReader>,
}

impl TransactionBuilder {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        Self { reader }
    }

    /// Build the pool call and, for token-pulling operations, any approval it needs first
    pub async fn build(
        &self,
        network: &NetworkConfig,
        operation: PoolOperation,
        asset: &AssetConfig,
        amount: U256,
        participants: Participants,
    ) -> Result<PreparedTransactions, ChainError> {
        let pool = self.reader.pool_address(network).await?;
        let nonce = self.reader.transaction_count(network, participants.sender).await?;

        let needs_approval = if operation.transfers_from_sender() && !asset.is_native() {
            let allowance = self
                .reader
                .allowance(network, asset.underlying, participants.sender, pool)
                .await?;
            debug!(token = %asset.symbol, %allowance, %amount, "Checked pool allowance");
            allowance < amount
        } else {
            false
        };

        let approval = needs_approval.then(|| UnsignedTransaction {
            to: asset.underlying,
            data: approve_calldata(pool, amount),
            from: participants.sender,
            nonce,
            chain_id: network.chain_id,
            gas: APPROVAL_GAS_LIMIT,
            value: U256::ZERO,
        });

        let main = UnsignedTransaction {
            to: pool,
            data: operation_calldata(operation, asset.underlying, amount, participants.on_behalf_of),
            from: participants.sender,
            nonce: if needs_approval { nonce + 1 } else { nonce },
            chain_id: network.chain_id,
            gas: operation.gas_limit(),
            value: U256::ZERO,
        };

        let gas_price_wei = match self.reader.gas_price(network).await {
            Ok(price) => price,
            Err(e) => {
                warn!(network = %network.name, error = %e, "Gas price unavailable, reporting zero cost");
                0
            }
        };

        Ok(PreparedTransactions {
            approval,
            main,
            gas_price_wei,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    #[test]
    fn test_calldata_selectors() {
        let asset = addr("0x4200000000000000000000000000000000000006");
        let user = addr("0x1111111111111111111111111111111111111111");
        let amount = U256::from(1_000u64);

        assert_eq!(&approve_calldata(user, amount)[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(&supply_calldata(asset, amount, user)[..4], &[0x61, 0x7b, 0xa0, 0x37]);
        assert_eq!(&borrow_calldata(asset, amount, user)[..4], &[0xa4, 0x15, 0xbc, 0xad]);
        assert_eq!(&repay_calldata(asset, amount, user)[..4], &[0x57, 0x3a, 0xde, 0x81]);
    }

    #[test]
    fn test_borrow_calldata_uses_variable_rate() {
        let asset = addr("0x4200000000000000000000000000000000000006");
        let user = addr("0x1111111111111111111111111111111111111111");
        let data = borrow_calldata(asset, U256::from(5u64), user);
        let decoded = IPool::borrowCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.interestRateMode, U256::from(2u64));
        assert_eq!(decoded.referralCode, 0);
        assert_eq!(decoded.onBehalfOf, user);
    }

    #[test]
    fn test_gas_cost_covers_both_transactions() {
        let tx = UnsignedTransaction {
            to: Address::ZERO,
            data: Bytes::new(),
            from: Address::ZERO,
            nonce: 0,
            chain_id: 1,
            gas: SUPPLY_GAS_LIMIT,
            value: U256::ZERO,
        };
        let prepared = PreparedTransactions {
            approval: Some(UnsignedTransaction { gas: APPROVAL_GAS_LIMIT, ..tx.clone() }),
            main: tx,
            gas_price_wei: 1_000_000_000,
        };
        assert_eq!(prepared.total_gas(), 350_000);
        assert!((prepared.gas_cost() - 0.00035).abs() < 1e-12);
    }

    #[test]
    fn test_gas_cost_saturates_on_absurd_gas_price() {
        let tx = UnsignedTransaction {
            to: Address::ZERO,
            data: Bytes::new(),
            from: Address::ZERO,
            nonce: 0,
            chain_id: 1,
            gas: SUPPLY_GAS_LIMIT,
            value: U256::ZERO,
        };
        let prepared = PreparedTransactions {
            approval: None,
            main: tx,
            gas_price_wei: u128::MAX,
        };
        assert_eq!(prepared.gas_cost(), wei_to_native(u128::MAX));
    }
}
