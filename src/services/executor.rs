use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::info;

pub use crate::config::ExecutionMode;
use crate::blockchain::ChainError;
use crate::config::{AssetConfig, NetworkConfig};
use crate::error::AppError;
use crate::models::SubmissionReceipt;
use crate::services::reader::{ContractReader, TransactionRelay};
use crate::services::tx_builder::{Participants, PoolOperation, PreparedTransactions, TransactionBuilder};
use crate::services::units::base_units_to_amount;

#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Unsigned transactions for the caller's wallet
    ReadyForSigning(PreparedTransactions),
    /// Signed with the executor key and mined
    Submitted {
        approval_receipt: Option<SubmissionReceipt>,
        receipt: SubmissionReceipt,
    },
}

/// Runs pool operations in whichever execution mode the gateway was started with
pub struct ActionExecutor {
    mode: ExecutionMode,
    reader: Arc<dyn ContractReader>,
    relay: Arc<dyn TransactionRelay>,
    builder: TransactionBuilder,
}

impl ActionExecutor {
    pub fn new(mode: ExecutionMode, reader: Arc<dyn ContractReader>, relay: Arc<dyn TransactionRelay>) -> Self {
        Self {
            mode,
            builder: TransactionBuilder::new(reader.clone()),
            reader,
            relay,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    pub async fn run(
        &self,
        network: &NetworkConfig,
        operation: PoolOperation,
        asset: &AssetConfig,
        amount: U256,
        user: Address,
    ) -> Result<ExecutionOutcome, AppError> {
        match self.mode {
            ExecutionMode::BuildForExternalSigning => {
                let participants = Participants {
                    sender: user,
                    on_behalf_of: user,
                };
                let prepared = self.builder.build(network, operation, asset, amount, participants).await?;
                Ok(ExecutionOutcome::ReadyForSigning(prepared))
            }
            ExecutionMode::ExecuteDirectly => self.execute(network, operation, asset, amount, user).await,
        }
    }

    async fn execute(
        &self,
        network: &NetworkConfig,
        operation: PoolOperation,
        asset: &AssetConfig,
        amount: U256,
        user: Address,
    ) -> Result<ExecutionOutcome, AppError> {
        let executor = self
            .relay
            .executor_address()
            .ok_or_else(|| AppError::ConfigError("execute-directly mode has no executor key".to_string()))?;

        if operation.transfers_from_sender() && !asset.is_native() {
            let balance = self
                .reader
                .token_balance(network, asset.underlying, executor)
                .await?;
            if balance < amount {
                return Err(AppError::InvalidAmount(format!(
                    "executor has insufficient {} balance: has {}",
                    asset.symbol,
                    base_units_to_amount(balance, asset.decimals)
                )));
            }
        }

        let participants = Participants {
            sender: executor,
            on_behalf_of: user,
        };
        let prepared = self.builder.build(network, operation, asset, amount, participants).await?;

        let approval_receipt = match &prepared.approval {
            Some(approval) => {
                let receipt = self.relay.sign_and_send(network, approval).await?;
                ensure_success(&receipt)?;
                info!(network = %network.name, tx_hash = %receipt.tx_hash, token = %asset.symbol, "Approval mined");
                Some(receipt)
            }
            None => None,
        };

        let receipt = self.relay.sign_and_send(network, &prepared.main).await?;
        ensure_success(&receipt)?;

        info!(
            network = %network.name,
            operation = operation.as_str(),
            tx_hash = %receipt.tx_hash,
            user = %user,
            "Executor submitted pool transaction"
        );

        Ok(ExecutionOutcome::Submitted {
            approval_receipt,
            receipt,
        })
    }
}

fn ensure_success(receipt: &SubmissionReceipt) -> Result<(), ChainError> {
    if receipt.success {
        Ok(())
    } else {
        Err(ChainError::Reverted(receipt.tx_hash.clone()))
    }
}
