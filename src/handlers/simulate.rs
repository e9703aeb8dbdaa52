use axum::{extract::State, response::Json, routing::post, Router};
use tracing::{info, warn};

use crate::blockchain::validate_address;
use crate::error::AppError;
use crate::models::{ActionKind, ActionRequest, Safety, SimulationResult, TokenData, TokenRiskParams};
use crate::services::simulator::simulate;
use crate::services::units::{ensure_positive_amount, round_to, UnitError, BASE_CURRENCY_UNIT};
use crate::services::{AuditEvent, AuditEventType};
use crate::AppState;

pub const SIMULATION_NOTE: &str = "Dry-run only; no blockchain transaction executed. Using Aave HF formula.";

/// Explicit action wins; otherwise a negative amount means borrow
fn resolve_action(action: Option<ActionKind>, amount: f64) -> Result<(ActionKind, f64), UnitError> {
    match action {
        Some(action) => Ok((action, ensure_positive_amount(amount)?)),
        None if amount < 0.0 => {
            let amount = ensure_positive_amount(amount.abs())?;
            warn!(amount, "No action given, inferring borrow from negative amount");
            Ok((ActionKind::Borrow, amount))
        }
        None => {
            let amount = ensure_positive_amount(amount)?;
            warn!(amount, "No action given, inferring supply");
            Ok((ActionKind::Supply, amount))
        }
    }
}

pub async fn simulate_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<SimulationResult>, AppError> {
    let network = state.network(request.network.as_deref())?;
    let asset = state.asset(network, &request.token)?;
    let user = validate_address(&request.user_address)?;
    let (action, amount) = resolve_action(request.action, request.amount)?;

    let snapshot = state.reader.account_snapshot(network, user).await?;
    let market = state.market_data.asset(network, asset).await;

    let params = TokenRiskParams {
        price_usd: market.price_usd,
        decimals: asset.decimals,
        liquidation_threshold: market.liquidation_threshold,
        ltv: market.ltv,
    };
    let outcome = simulate(&snapshot, &params, action, amount)?;

    info!(
        network = %network.name,
        user = %user,
        token = %asset.symbol,
        amount,
        action = %action,
        health_factor_before = outcome.health_factor_before,
        health_factor_after = outcome.health_factor_after,
        "Simulated action"
    );

    state.audit.record(AuditEvent::new(
        AuditEventType::Simulate,
        &network.name,
        format!(
            "Simulated {} of {} {} for {} on {}: HF {:.3} -> {:.3}",
            action, amount, asset.symbol, user, network.name, outcome.health_factor_before, outcome.health_factor_after
        ),
    ));

    let (available_borrows, current_capacity_check) = match action {
        ActionKind::Borrow => {
            let check = if outcome.safety == Safety::InsufficientCapacity {
                "insufficient"
            } else {
                "sufficient"
            };
            (
                Some(round_to(snapshot.available_borrows_base / BASE_CURRENCY_UNIT, 6)),
                Some(check.to_string()),
            )
        }
        ActionKind::Supply => (None, None),
    };

    Ok(Json(SimulationResult {
        action,
        token: asset.symbol.clone(),
        amount,
        network: network.name.clone(),
        health_factor_before: outcome.health_factor_before,
        health_factor_after_est: outcome.health_factor_after,
        safety: outcome.safety,
        token_data: TokenData {
            price_usd: round_to(market.price_usd, 6),
            ltv: round_to(market.ltv, 4),
            liquidation_threshold: round_to(market.liquidation_threshold, 4),
            source: market.price_source,
        },
        note: SIMULATION_NOTE.to_string(),
        available_borrows,
        current_capacity_check,
    }))
}

pub fn create_simulation_routes() -> Router<AppState> {
    Router::new().route("/simulate", post(simulate_action))
}
