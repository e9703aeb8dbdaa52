use alloy::primitives::{Address, Bytes};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{ExecuteTransactionRequest, ExecuteTransactionResponse, GasEstimateResponse};
use crate::services::tx_builder::{supply_calldata, APPROVAL_GAS_LIMIT, SUPPLY_GAS_LIMIT};
use crate::services::units::{amount_to_base_units, ensure_positive_amount, round_to, wei_to_gwei, wei_to_native};
use crate::services::{AuditEvent, AuditEventType};
use crate::AppState;

fn decode_signed_transaction(raw: &str) -> Result<Bytes, AppError> {
    let trimmed = raw.trim();
    let hex_body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_body)
        .map_err(|e| AppError::ValidationError(format!("signed_transaction is not valid hex: {}", e)))?;
    if bytes.is_empty() {
        return Err(AppError::ValidationError("signed_transaction is empty".to_string()));
    }
    Ok(Bytes::from(bytes))
}

pub async fn execute_transaction(
    State(state): State<AppState>,
    Json(request): Json<ExecuteTransactionRequest>,
) -> Result<Json<ExecuteTransactionResponse>, AppError> {
    let network = state.network(request.network.as_deref())?;
    let raw = decode_signed_transaction(&request.signed_transaction)?;

    let receipt = state.relay.send_raw_transaction(network, raw).await?;
    if !receipt.success {
        warn!(network = %network.name, tx_hash = %receipt.tx_hash, "Submitted transaction reverted");
        return Err(AppError::TransactionFailed(format!("transaction {} reverted", receipt.tx_hash)));
    }

    info!(network = %network.name, tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "Signed transaction mined");
    state.audit.record(AuditEvent::new(
        AuditEventType::ExecuteTransaction,
        &network.name,
        format!("Executed signed transaction {} on {}", receipt.tx_hash, network.name),
    ));

    Ok(Json(ExecuteTransactionResponse {
        status: "success".to_string(),
        receipt,
    }))
}

pub async fn estimate_gas(
    State(state): State<AppState>,
    Path((network, token, amount)): Path<(String, String, f64)>,
) -> Result<Json<GasEstimateResponse>, AppError> {
    let network = state.network(Some(&network))?;
    let asset = state.asset(network, &token)?;
    let amount = ensure_positive_amount(amount)?;
    let units = amount_to_base_units(amount, asset.decimals)?;

    let pool = state.reader.pool_address(network).await?;
    let data = supply_calldata(asset.underlying, units, Address::ZERO);
    let supply_gas = match state.reader.estimate_gas(network, Address::ZERO, pool, data).await {
        Ok(gas) => gas,
        Err(e) => {
            warn!(network = %network.name, token = %asset.symbol, error = %e, "Gas estimation failed, using default limit");
            SUPPLY_GAS_LIMIT
        }
    };

    let needs_approval = !asset.is_native();
    let approval_gas = if needs_approval { APPROVAL_GAS_LIMIT } else { 0 };
    let gas_price = state.reader.gas_price(network).await?;

    let cost = |gas: u64| round_to(wei_to_native(u128::from(gas).saturating_mul(gas_price)), 8);
    let total_gas = supply_gas + approval_gas;

    Ok(Json(GasEstimateResponse {
        network: network.name.clone(),
        token: asset.symbol.clone(),
        amount,
        supply_gas_estimate: supply_gas,
        supply_gas_cost: cost(supply_gas),
        approval_gas_estimate: approval_gas,
        approval_gas_cost: cost(approval_gas),
        total_gas_estimate: total_gas,
        total_gas_cost: cost(total_gas),
        needs_approval,
        gas_price_gwei: round_to(wei_to_gwei(gas_price), 4),
    }))
}

pub fn create_transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/execute/transaction", post(execute_transaction))
        .route("/gas/estimate/:network/:token/:amount", get(estimate_gas))
}
