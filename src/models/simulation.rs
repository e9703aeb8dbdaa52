use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Supply,
    Borrow,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Supply => write!(f, "supply"),
            ActionKind::Borrow => write!(f, "borrow"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Safety {
    Safe,
    Risky,
    InsufficientCapacity,
}

/// Market parameters of the token being supplied or borrowed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenRiskParams {
    pub price_usd: f64,
    pub decimals: u8,
    pub liquidation_threshold: f64,
    pub ltv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOutcome {
    pub health_factor_before: f64,
    pub health_factor_after: f64,
    pub safety: Safety,
    /// Action size in base-currency units
    pub value_base: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub price_usd: f64,
    pub ltv: f64,
    pub liquidation_threshold: f64,
    pub source: super::MarketDataSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub action: ActionKind,
    pub token: String,
    pub amount: f64,
    pub network: String,
    pub health_factor_before: f64,
    pub health_factor_after_est: f64,
    pub safety: Safety,
    pub token_data: TokenData,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_borrows: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_capacity_check: Option<String>,
}
