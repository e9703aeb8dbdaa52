use alloy::primitives::{Address, U256};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::blockchain::validate_address;
use crate::config::{AssetConfig, NetworkConfig};
use crate::error::AppError;
use crate::models::{BalanceResponse, HealthResponse, TokenBalance};
use crate::services::simulator::{display_health_factor, is_safe_to_borrow};
use crate::services::units::{base_units_to_amount, round_to};
use crate::AppState;

pub async fn get_health(
    State(state): State<AppState>,
    Path((network, user)): Path<(String, String)>,
) -> Result<Json<HealthResponse>, AppError> {
    let network = state.network(Some(&network))?;
    let user = validate_address(&user)?;

    let snapshot = state.reader.account_snapshot(network, user).await?;
    let response = HealthResponse {
        health_factor: display_health_factor(&snapshot),
        safe_to_borrow: is_safe_to_borrow(&snapshot),
    };

    info!(
        network = %network.name,
        user = %user,
        health_factor = response.health_factor,
        safe_to_borrow = response.safe_to_borrow,
        "Health factor read"
    );

    Ok(Json(response))
}

/// Balance of one token contract, zero when absent or unreadable
async fn read_balance(
    state: &AppState,
    network: &NetworkConfig,
    token: Option<Address>,
    owner: Address,
    symbol: &str,
) -> U256 {
    let Some(token) = token else {
        return U256::ZERO;
    };
    match state.reader.token_balance(network, token, owner).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(network = %network.name, token = %symbol, contract = %token, error = %e, "Balance read failed");
            U256::ZERO
        }
    }
}

async fn token_balances(state: &AppState, network: &NetworkConfig, asset: &AssetConfig, owner: Address) -> TokenBalance {
    let underlying = if asset.is_native() {
        U256::ZERO
    } else {
        read_balance(state, network, Some(asset.underlying), owner, &asset.symbol).await
    };
    let a_token = read_balance(state, network, asset.a_token, owner, &asset.symbol).await;
    let v_token = read_balance(state, network, asset.v_token, owner, &asset.symbol).await;

    TokenBalance {
        underlying: round_to(base_units_to_amount(underlying, asset.decimals), 6),
        a_token: round_to(base_units_to_amount(a_token, asset.decimals), 6),
        v_token: round_to(base_units_to_amount(v_token, asset.decimals), 6),
        underlying_address: Some(asset.underlying.to_checksum(None)),
        a_token_address: asset.a_token.map(|a| a.to_checksum(None)),
        v_token_address: asset.v_token.map(|a| a.to_checksum(None)),
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path((network, user)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, AppError> {
    let network = state.network(Some(&network))?;
    let user = validate_address(&user)?;

    let reads = network.assets.values().map(|asset| {
        let state = &state;
        async move { (asset.symbol.clone(), token_balances(state, network, asset, user).await) }
    });
    let tokens: BTreeMap<String, TokenBalance> = join_all(reads).await.into_iter().collect();

    let market = state.market_data.snapshot(network).await;
    let mut total_supply_value = 0.0;
    let mut total_borrow_value = 0.0;
    for (symbol, balance) in &tokens {
        let price = market.snapshot.asset(symbol).map(|m| m.price_usd).unwrap_or(0.0);
        total_supply_value += balance.a_token * price;
        total_borrow_value += balance.v_token * price;
    }

    debug!(network = %network.name, user = %user, tokens = tokens.len(), "Balances read");

    Ok(Json(BalanceResponse {
        address: user.to_checksum(None),
        network: network.name.clone(),
        total_supply_value: round_to(total_supply_value, 6),
        total_borrow_value: round_to(total_borrow_value, 6),
        tokens,
    }))
}

pub fn create_account_routes() -> Router<AppState> {
    Router::new()
        .route("/health/:network/:user", get(get_health))
        .route("/balance/:network/:user", get(get_balance))
}
