//! Client-side estimate of how a supply or borrow moves a position's health factor.
//!
//! Mirrors the pool's formula `HF = collateral * weighted LT / debt` using the
//! account data returned by `getUserAccountData`. Values are in 8-decimal
//! base-currency units, thresholds are fractions.

use crate::models::{AccountSnapshot, ActionKind, Safety, SimulationOutcome, TokenRiskParams};
use crate::services::units::{amount_to_base_units, base_units_to_amount, round_to, UnitError, BASE_CURRENCY_UNIT};

/// Displayed health factor when there is no debt, and the ceiling for all others
pub const HEALTH_FACTOR_CAP: f64 = 999.999;

/// Gateway policy: below this a borrow is refused or flagged as risky
pub const SAFE_HEALTH_FACTOR: f64 = 1.1;

pub fn cap_health_factor(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    round_to(value.clamp(0.0, HEALTH_FACTOR_CAP), 3)
}

pub fn classify(health_factor: f64) -> Safety {
    if health_factor >= SAFE_HEALTH_FACTOR {
        Safety::Safe
    } else {
        Safety::Risky
    }
}

pub fn health_factor(collateral_base: f64, liquidation_threshold: f64, debt_base: f64) -> f64 {
    if debt_base <= 0.0 {
        return HEALTH_FACTOR_CAP;
    }
    cap_health_factor(collateral_base * liquidation_threshold / debt_base)
}

/// Health factor as reported to callers; debt-free accounts show the cap
pub fn display_health_factor(snapshot: &AccountSnapshot) -> f64 {
    if !snapshot.has_debt() {
        return HEALTH_FACTOR_CAP;
    }
    cap_health_factor(snapshot.health_factor)
}

pub fn is_safe_to_borrow(snapshot: &AccountSnapshot) -> bool {
    !snapshot.has_debt() || display_health_factor(snapshot) >= SAFE_HEALTH_FACTOR
}

/// Base-currency value of `amount` tokens, using only what would actually be transferred
pub fn value_in_base(amount: f64, token: &TokenRiskParams) -> Result<f64, UnitError> {
    let units = amount_to_base_units(amount, token.decimals)?;
    let transferable = base_units_to_amount(units, token.decimals);
    Ok(transferable * token.price_usd * BASE_CURRENCY_UNIT)
}

pub fn simulate(
    snapshot: &AccountSnapshot,
    token: &TokenRiskParams,
    action: ActionKind,
    amount: f64,
) -> Result<SimulationOutcome, UnitError> {
    let value_base = value_in_base(amount, token)?;
    let health_factor_before = display_health_factor(snapshot);

    let outcome = match action {
        ActionKind::Supply => {
            let new_collateral = snapshot.total_collateral_base + value_base;
            let weighted_threshold = if new_collateral > 0.0 {
                (snapshot.total_collateral_base * snapshot.current_liquidation_threshold
                    + value_base * token.liquidation_threshold)
                    / new_collateral
            } else {
                token.liquidation_threshold
            };

            let after = health_factor(new_collateral, weighted_threshold, snapshot.total_debt_base);
            SimulationOutcome {
                health_factor_before,
                health_factor_after: after,
                safety: classify(after),
                value_base,
            }
        }
        ActionKind::Borrow => {
            if value_base > snapshot.available_borrows_base {
                return Ok(SimulationOutcome {
                    health_factor_before,
                    health_factor_after: 0.0,
                    safety: Safety::InsufficientCapacity,
                    value_base,
                });
            }

            let after = health_factor(
                snapshot.total_collateral_base,
                snapshot.current_liquidation_threshold,
                snapshot.total_debt_base + value_base,
            );
            SimulationOutcome {
                health_factor_before,
                health_factor_after: after,
                safety: classify(after),
                value_base,
            }
        }
    };

    Ok(outcome)
}
