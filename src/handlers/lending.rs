use axum::{extract::State, response::Json, routing::post, Router};
use tracing::{info, warn};

use crate::blockchain::validate_address;
use crate::error::AppError;
use crate::models::{
    ActionRequest, ActionResponse, BuildTransactionRequest, BuildTransactionResponse, MarketDataSource,
    TokenRiskParams, TransactionPayload,
};
use crate::services::executor::ExecutionOutcome;
use crate::services::simulator::{display_health_factor, value_in_base, SAFE_HEALTH_FACTOR};
use crate::services::tx_builder::{Participants, PoolOperation, PreparedTransactions};
use crate::services::units::{amount_to_base_units, ensure_positive_amount, BASE_CURRENCY_UNIT};
use crate::services::{AuditEvent, AuditEventType};
use crate::AppState;

fn signing_note(prepared: &PreparedTransactions) -> String {
    if prepared.approval.is_some() {
        "Sign and send approval_transaction first, then transaction. Nonces are already sequenced.".to_string()
    } else {
        "Sign and send transaction with your wallet.".to_string()
    }
}

fn audit_type(operation: PoolOperation) -> AuditEventType {
    match operation {
        PoolOperation::Supply => AuditEventType::Supply,
        PoolOperation::Borrow => AuditEventType::Borrow,
        PoolOperation::Repay => AuditEventType::Repay,
    }
}

async fn run_pool_action(
    state: AppState,
    request: ActionRequest,
    operation: PoolOperation,
) -> Result<Json<ActionResponse>, AppError> {
    let network = state.network(request.network.as_deref())?;
    let asset = state.asset(network, &request.token)?;
    let user = validate_address(&request.user_address)?;
    let amount = ensure_positive_amount(request.amount)?;
    let units = amount_to_base_units(amount, asset.decimals)?;

    let health_factor_before = if operation == PoolOperation::Borrow {
        let snapshot = state.reader.account_snapshot(network, user).await?;
        let health_factor = display_health_factor(&snapshot);

        if snapshot.has_debt() && health_factor < SAFE_HEALTH_FACTOR {
            warn!(network = %network.name, user = %user, health_factor, "Borrow blocked by health factor policy");
            state.audit.record(AuditEvent::new(
                AuditEventType::BorrowBlocked,
                &network.name,
                format!(
                    "Blocked borrow of {} {} for {} on {}: health factor {:.3}",
                    amount, asset.symbol, user, network.name, health_factor
                ),
            ));
            return Err(AppError::BorrowBlocked { health_factor });
        }

        // Only trust live prices for a hard capacity refusal
        let market = state.market_data.asset(network, asset).await;
        if market.price_source == MarketDataSource::Oracle {
            let params = TokenRiskParams {
                price_usd: market.price_usd,
                decimals: asset.decimals,
                liquidation_threshold: market.liquidation_threshold,
                ltv: market.ltv,
            };
            let value_base = value_in_base(amount, &params)?;
            if value_base > snapshot.available_borrows_base {
                return Err(AppError::InsufficientCapacity {
                    requested: value_base / BASE_CURRENCY_UNIT,
                    available: snapshot.available_borrows_base / BASE_CURRENCY_UNIT,
                });
            }
        }

        Some(health_factor)
    } else {
        None
    };

    let outcome = state.executor.run(network, operation, asset, units, user).await?;

    info!(
        network = %network.name,
        user = %user,
        token = %asset.symbol,
        amount,
        operation = operation.as_str(),
        "Pool action handled"
    );

    let response = match outcome {
        ExecutionOutcome::ReadyForSigning(prepared) => {
            state.audit.record(AuditEvent::new(
                audit_type(operation),
                &network.name,
                format!(
                    "Prepared {} of {} {} for {} on {}",
                    operation.as_str(),
                    amount,
                    asset.symbol,
                    user,
                    network.name
                ),
            ));

            let note = signing_note(&prepared);
            let gas_cost = prepared.gas_cost();
            ActionResponse {
                status: "ready_for_signing".to_string(),
                tx_hash: None,
                approval_tx_hash: None,
                health_factor_before,
                transaction_data: Some(TransactionPayload {
                    transaction: prepared.main,
                    approval_transaction: prepared.approval,
                    gas_cost,
                    note,
                }),
            }
        }
        ExecutionOutcome::Submitted {
            approval_receipt,
            receipt,
        } => {
            state.audit.record(AuditEvent::new(
                audit_type(operation),
                &network.name,
                format!(
                    "Executed {} of {} {} for {} on {}: {}",
                    operation.as_str(),
                    amount,
                    asset.symbol,
                    user,
                    network.name,
                    receipt.tx_hash
                ),
            ));

            ActionResponse {
                status: "submitted".to_string(),
                tx_hash: Some(receipt.tx_hash),
                approval_tx_hash: approval_receipt.map(|r| r.tx_hash),
                health_factor_before,
                transaction_data: None,
            }
        }
    };

    Ok(Json(response))
}

pub async fn supply(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    run_pool_action(state, request, PoolOperation::Supply).await
}

pub async fn borrow(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    run_pool_action(state, request, PoolOperation::Borrow).await
}

pub async fn repay(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    run_pool_action(state, request, PoolOperation::Repay).await
}

/// Unsigned supply transaction for the caller's wallet, regardless of execution mode
pub async fn build_transaction(
    State(state): State<AppState>,
    Json(request): Json<BuildTransactionRequest>,
) -> Result<Json<BuildTransactionResponse>, AppError> {
    let network = state.network(request.network.as_deref())?;
    let asset = state.asset(network, &request.token)?;
    let user = validate_address(&request.user_address)?;
    let amount = ensure_positive_amount(request.amount)?;
    let units = amount_to_base_units(amount, asset.decimals)?;

    let participants = Participants {
        sender: user,
        on_behalf_of: user,
    };
    let prepared = state
        .executor
        .builder()
        .build(network, PoolOperation::Supply, asset, units, participants)
        .await?;

    state.audit.record(AuditEvent::new(
        AuditEventType::BuildTransaction,
        &network.name,
        format!("Built supply transaction of {} {} for {} on {}", amount, asset.symbol, user, network.name),
    ));

    let note = signing_note(&prepared);
    Ok(Json(BuildTransactionResponse {
        status: "ready".to_string(),
        gas_estimate: prepared.total_gas(),
        estimated_gas_cost: prepared.gas_cost(),
        transaction_data: prepared.main,
        approval_tx_data: prepared.approval,
        slippage_tolerance_bps: request.slippage_tolerance_bps,
        note,
    }))
}

pub fn create_lending_routes() -> Router<AppState> {
    Router::new()
        .route("/supply", post(supply))
        .route("/borrow", post(borrow))
        .route("/repay", post(repay))
        .route("/build/transaction", post(build_transaction))
}
