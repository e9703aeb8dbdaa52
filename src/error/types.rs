use std::fmt;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::blockchain::ChainError;
use crate::config::NetworkConfigError;
use crate::services::units::UnitError;

#[derive(Debug, Clone)]
pub enum AppError {
    UnsupportedAsset { token: String, network: String },
    UnsupportedNetwork(String),
    InvalidAddress(String),
    InvalidAmount(String),
    ValidationError(String),
    BorrowBlocked { health_factor: f64 },
    InsufficientCapacity { requested: f64, available: f64 },
    UpstreamUnavailable(String),
    TransactionFailed(String),
    ConfigError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnsupportedAsset { token, network } => {
                write!(f, "{} not supported on {}", token, network)
            }
            AppError::UnsupportedNetwork(network) => write!(f, "Unsupported network: {}", network),
            AppError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            AppError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::BorrowBlocked { health_factor } => write!(
                f,
                "Health factor too low to borrow safely: {:.3}",
                health_factor
            ),
            AppError::InsufficientCapacity { requested, available } => write!(
                f,
                "Insufficient borrow capacity: requested {:.2}, available {:.2}",
                requested, available
            ),
            AppError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            AppError::TransactionFailed(msg) => write!(f, "Transaction failed: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedAsset { .. }
            | AppError::UnsupportedNetwork(_)
            | AppError::InvalidAddress(_)
            | AppError::InvalidAmount(_)
            | AppError::ValidationError(_)
            | AppError::BorrowBlocked { .. }
            | AppError::InsufficientCapacity { .. } => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) | AppError::TransactionFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidAddress(msg) => AppError::InvalidAddress(msg),
            ChainError::Reverted(msg) => AppError::TransactionFailed(msg),
            ChainError::SignerUnavailable => {
                AppError::ConfigError("no executor key configured".to_string())
            }
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<UnitError> for AppError {
    fn from(err: UnitError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}

impl From<NetworkConfigError> for AppError {
    fn from(err: NetworkConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}
