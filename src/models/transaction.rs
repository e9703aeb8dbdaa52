use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize, Serializer};

use super::ActionKind;

/// Body shared by supply, borrow, repay and simulate
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub amount: f64,
    pub token: String,
    #[serde(default)]
    pub network: Option<String>,
    pub user_address: String,
    #[serde(default)]
    pub action: Option<ActionKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildTransactionRequest {
    pub amount: f64,
    pub token: String,
    #[serde(default)]
    pub network: Option<String>,
    pub user_address: String,
    #[serde(default = "default_slippage_bps")]
    pub slippage_tolerance_bps: u32,
}

fn default_slippage_bps() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteTransactionRequest {
    pub signed_transaction: String,
    #[serde(default)]
    pub network: Option<String>,
}

fn serialize_checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn serialize_hex<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(data)))
}

/// Transaction ready for an external signer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsignedTransaction {
    #[serde(serialize_with = "serialize_checksummed")]
    pub to: Address,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Bytes,
    #[serde(serialize_with = "serialize_checksummed")]
    pub from: Address,
    pub nonce: u64,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub gas: u64,
    /// Wei attached to the call, rendered as a decimal string
    #[serde(serialize_with = "serialize_decimal")]
    pub value: U256,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPayload {
    pub transaction: UnsignedTransaction,
    pub approval_transaction: Option<UnsignedTransaction>,
    /// Native-token cost of all included transactions at the current gas price
    pub gas_cost: f64,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub status: String,
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_factor_before: Option<f64>,
    pub transaction_data: Option<TransactionPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildTransactionResponse {
    pub status: String,
    pub transaction_data: UnsignedTransaction,
    pub gas_estimate: u64,
    pub estimated_gas_cost: f64,
    pub approval_tx_data: Option<UnsignedTransaction>,
    pub slippage_tolerance_bps: u32,
    pub note: String,
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: u128,
    pub effective_gas_price: u128,
    #[serde(skip)]
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteTransactionResponse {
    pub status: String,
    #[serde(flatten)]
    pub receipt: SubmissionReceipt,
}

#[derive(Debug, Clone, Serialize)]
pub struct GasEstimateResponse {
    pub network: String,
    pub token: String,
    pub amount: f64,
    pub supply_gas_estimate: u64,
    pub supply_gas_cost: f64,
    pub approval_gas_estimate: u64,
    pub approval_gas_cost: f64,
    pub total_gas_estimate: u64,
    pub total_gas_cost: f64,
    pub needs_approval: bool,
    pub gas_price_gwei: f64,
}
