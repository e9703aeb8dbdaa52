use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::services::simulator::SAFE_HEALTH_FACTOR;
use crate::AppState;

pub const RECOMMENDED_HEALTH_FACTOR: f64 = 2.0;
pub const MAX_BORROW_PERCENTAGE: f64 = 0.75;

/// Capability descriptor for agent discovery
pub async fn mcp_manifest(State(state): State<AppState>) -> Json<Value> {
    let default_network = state.settings.chain.default_network.clone();
    let networks = state.networks.names();
    let mut tokens: Vec<String> = state.networks.networks().flat_map(|n| n.symbols()).collect();
    tokens.sort();
    tokens.dedup();

    Json(json!({
        "name": "Aave Concierge MCP",
        "description": "Aave V3 lending gateway: supply, borrow and repay as unsigned transactions, with health factor checks and dry-run simulation.",
        "version": env!("CARGO_PKG_VERSION"),
        "license": "MIT",
        "servers": [
            {
                "url": format!("http://{}:{}", state.settings.api.host, state.settings.api.port),
                "variables": {
                    "network": {
                        "default": default_network,
                        "enum": networks,
                        "description": "Target network for Aave operations"
                    }
                }
            }
        ],
        "execution_mode": state.executor.mode().to_string(),
        "ai_guidelines": {
            "recommended_workflow": [
                "GET /health/{network}/{user}",
                "GET /balance/{network}/{user}",
                "POST /simulate",
                "POST /supply, /borrow or /repay",
                "POST /execute/transaction"
            ],
            "safety_checks": [
                "Simulate before executing",
                "Keep the health factor above the minimum",
                "Check gas costs before execution"
            ],
            "risk_management": {
                "minimum_health_factor": SAFE_HEALTH_FACTOR,
                "recommended_health_factor": RECOMMENDED_HEALTH_FACTOR,
                "max_borrow_percentage": MAX_BORROW_PERCENTAGE
            }
        },
        "methods": {
            "supply": {
                "endpoint": "POST /supply",
                "parameters": ["amount", "token", "network", "user_address"],
                "tokens": tokens,
                "returns": "Unsigned transaction plus approval transaction when allowance is short"
            },
            "borrow": {
                "endpoint": "POST /borrow",
                "parameters": ["amount", "token", "network", "user_address"],
                "returns": "Unsigned transaction and health_factor_before; refused below the minimum health factor"
            },
            "repay": {
                "endpoint": "POST /repay",
                "parameters": ["amount", "token", "network", "user_address"],
                "returns": "Unsigned transaction plus approval transaction when allowance is short"
            },
            "simulate": {
                "endpoint": "POST /simulate",
                "parameters": ["amount", "token", "network", "user_address", "action"],
                "returns": "health_factor_before, health_factor_after_est, safety, token_data"
            },
            "health": {
                "endpoint": "GET /health/{network}/{user}",
                "returns": "health_factor, safe_to_borrow"
            },
            "balance": {
                "endpoint": "GET /balance/{network}/{user}",
                "returns": "Underlying, aToken and vToken balances per token with aggregate values"
            },
            "prices": {
                "endpoint": "GET /prices/{network}",
                "returns": "Oracle prices, LTV and liquidation thresholds, cached per network"
            },
            "build_transaction": {
                "endpoint": "POST /build/transaction",
                "returns": "Unsigned supply transaction with gas estimate"
            },
            "execute_transaction": {
                "endpoint": "POST /execute/transaction",
                "parameters": ["signed_transaction", "network"],
                "returns": "tx_hash, block_number, gas_used"
            },
            "gas_estimate": {
                "endpoint": "GET /gas/estimate/{network}/{token}/{amount}",
                "returns": "Supply and approval gas with costs in native token"
            }
        }
    }))
}

pub fn create_manifest_routes() -> Router<AppState> {
    Router::new().route("/mcp-manifest", get(mcp_manifest))
}
