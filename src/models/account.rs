use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::units::{bps_to_fraction, u256_to_f64, wad_to_f64};

/// Live per-user lending position on one network, in 8-decimal base-currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub total_collateral_base: f64,
    pub total_debt_base: f64,
    pub available_borrows_base: f64,
    /// Weighted liquidation threshold as a fraction
    pub current_liquidation_threshold: f64,
    /// Weighted loan-to-value as a fraction
    pub ltv: f64,
    pub health_factor: f64,
}

impl AccountSnapshot {
    /// Build from the raw `getUserAccountData` words
    pub fn from_raw(
        total_collateral_base: U256,
        total_debt_base: U256,
        available_borrows_base: U256,
        current_liquidation_threshold: U256,
        ltv: U256,
        health_factor: U256,
    ) -> Self {
        Self {
            total_collateral_base: u256_to_f64(total_collateral_base),
            total_debt_base: u256_to_f64(total_debt_base),
            available_borrows_base: u256_to_f64(available_borrows_base),
            current_liquidation_threshold: bps_to_fraction(current_liquidation_threshold),
            ltv: bps_to_fraction(ltv),
            health_factor: wad_to_f64(health_factor),
        }
    }

    pub fn has_debt(&self) -> bool {
        self.total_debt_base > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub health_factor: f64,
    pub safe_to_borrow: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBalance {
    pub underlying: f64,
    #[serde(rename = "aToken")]
    pub a_token: f64,
    #[serde(rename = "vToken")]
    pub v_token: f64,
    pub underlying_address: Option<String>,
    #[serde(rename = "aToken_address")]
    pub a_token_address: Option<String>,
    #[serde(rename = "vToken_address")]
    pub v_token_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub network: String,
    pub total_supply_value: f64,
    pub total_borrow_value: f64,
    pub tokens: BTreeMap<String, TokenBalance>,
}
