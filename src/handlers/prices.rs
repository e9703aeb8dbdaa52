use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::AssetMarketData;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PricesResponse {
    pub network: String,
    pub timestamp: DateTime<Utc>,
    pub oracle_address: Option<String>,
    pub cache_expires_at: DateTime<Utc>,
    pub prices: BTreeMap<String, AssetMarketData>,
}

pub async fn get_prices(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Json<PricesResponse>, AppError> {
    let network = state.network(Some(&network))?;
    let cached = state.market_data.snapshot(network).await;

    Ok(Json(PricesResponse {
        network: cached.snapshot.network.clone(),
        timestamp: cached.snapshot.timestamp,
        oracle_address: cached.snapshot.oracle_address.clone(),
        cache_expires_at: cached.expires_at,
        prices: cached.snapshot.prices.clone(),
    }))
}

pub fn create_price_routes() -> Router<AppState> {
    Router::new().route("/prices/:network", get(get_prices))
}
