use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

#[derive(Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub default_network: String,
    pub execution_mode: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: String,
    pub raw_name: String,
    pub chain_id: u64,
    pub tokens: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworksResponse {
    pub default_network: String,
    pub networks: Vec<NetworkSummary>,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<LivenessResponse>, AppError> {
    Ok(Json(LivenessResponse {
        status: "healthy".to_string(),
        service: "aave-concierge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_network: state.settings.chain.default_network.clone(),
        execution_mode: state.executor.mode().to_string(),
        timestamp: Utc::now(),
    }))
}

pub async fn list_networks(State(state): State<AppState>) -> Result<Json<NetworksResponse>, AppError> {
    let networks = state
        .networks
        .networks()
        .map(|network| NetworkSummary {
            name: network.name.clone(),
            raw_name: network.raw_name.clone(),
            chain_id: network.chain_id,
            tokens: network.symbols(),
        })
        .collect();

    Ok(Json(NetworksResponse {
        default_network: state.settings.chain.default_network.clone(),
        networks,
    }))
}

pub fn create_health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/networks", get(list_networks))
}
