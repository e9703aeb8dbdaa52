// Human token amounts <-> on-chain base units
use alloy::primitives::U256;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};

/// Largest human amount accepted for any token
pub const MAX_HUMAN_AMOUNT: f64 = 1_000_000_000.0;

/// Oracle prices and Aave base-currency values carry 8 decimals
pub const BASE_CURRENCY_UNIT: f64 = 1e8;
pub const BPS_DENOMINATOR: f64 = 10_000.0;
pub const WAD: f64 = 1e18;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("amount must be a finite number")]
    NotFinite,

    #[error("amount cannot be negative: {0}")]
    Negative(f64),

    #[error("amount must be greater than zero")]
    Zero,

    #[error("amount {0} exceeds the maximum of 1,000,000,000 tokens")]
    TooLarge(f64),

    #[error("amount {amount} cannot be represented with {decimals} decimals")]
    Overflow { amount: f64, decimals: u8 },
}

fn check_bounds(amount: f64) -> Result<(), UnitError> {
    if !amount.is_finite() {
        return Err(UnitError::NotFinite);
    }
    if amount < 0.0 {
        return Err(UnitError::Negative(amount));
    }
    if amount > MAX_HUMAN_AMOUNT {
        return Err(UnitError::TooLarge(amount));
    }
    Ok(())
}

/// Amount accepted for a mutating action: strictly positive and within bounds
pub fn ensure_positive_amount(amount: f64) -> Result<f64, UnitError> {
    check_bounds(amount)?;
    if amount == 0.0 {
        return Err(UnitError::Zero);
    }
    Ok(amount)
}

/// Convert a human amount to base units, truncating toward zero
pub fn amount_to_base_units(amount: f64, decimals: u8) -> Result<U256, UnitError> {
    check_bounds(amount)?;

    let overflow = UnitError::Overflow { amount, decimals };
    let human = Decimal::from_f64(amount).ok_or_else(|| overflow.clone())?;
    let scale = Decimal::TEN
        .checked_powu(u64::from(decimals))
        .ok_or_else(|| overflow.clone())?;

    let base = human.checked_mul(scale).ok_or_else(|| overflow.clone())?.trunc();
    let base = base.to_u128().ok_or(overflow)?;

    Ok(U256::from(base))
}

/// Convert base units back to a human amount
pub fn base_units_to_amount(value: U256, decimals: u8) -> f64 {
    if let Ok(raw) = u128::try_from(value) {
        if let Ok(raw) = i128::try_from(raw) {
            if let Ok(exact) = Decimal::try_from_i128_with_scale(raw, u32::from(decimals)) {
                if let Some(amount) = exact.to_f64() {
                    return amount;
                }
            }
        }
    }

    u256_to_f64(value) / 10f64.powi(i32::from(decimals))
}

/// Lossy conversion used for values that only feed ratios and display
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

pub fn bps_to_fraction(value: U256) -> f64 {
    u256_to_f64(value) / BPS_DENOMINATOR
}

pub fn wad_to_f64(value: U256) -> f64 {
    u256_to_f64(value) / WAD
}

/// Oracle answer (8 decimals) to USD
pub fn oracle_price_to_usd(value: U256) -> f64 {
    u256_to_f64(value) / BASE_CURRENCY_UNIT
}

pub fn wei_to_native(wei: u128) -> f64 {
    wei as f64 / WAD
}

pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / 1e9
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_token_decimals() {
        assert_eq!(amount_to_base_units(1.5, 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(amount_to_base_units(0.01, 8).unwrap(), U256::from(1_000_000u64));
        assert_eq!(amount_to_base_units(12.34, 2).unwrap(), U256::from(1234u64));
        assert_eq!(
            amount_to_base_units(1.0, 18).unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(amount_to_base_units(1.2345679, 6).unwrap(), U256::from(1_234_567u64));
        assert_eq!(amount_to_base_units(0.009, 2).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert_eq!(amount_to_base_units(-1.0, 6), Err(UnitError::Negative(-1.0)));
        assert_eq!(amount_to_base_units(2e9, 6), Err(UnitError::TooLarge(2e9)));
        assert_eq!(amount_to_base_units(f64::NAN, 6), Err(UnitError::NotFinite));
        assert_eq!(amount_to_base_units(f64::INFINITY, 6), Err(UnitError::NotFinite));
        assert!(matches!(amount_to_base_units(1e9, 28), Err(UnitError::Overflow { .. })));
    }

    #[test]
    fn test_zero_is_valid_for_conversion_but_not_for_actions() {
        assert_eq!(amount_to_base_units(0.0, 18).unwrap(), U256::ZERO);
        assert_eq!(ensure_positive_amount(0.0), Err(UnitError::Zero));
        assert_eq!(ensure_positive_amount(5.0), Ok(5.0));
    }

    #[test]
    fn test_base_units_to_amount() {
        assert_eq!(base_units_to_amount(U256::from(1_500_000u64), 6), 1.5);
        assert_eq!(base_units_to_amount(U256::from(1234u64), 2), 12.34);
        assert_eq!(base_units_to_amount(U256::ZERO, 18), 0.0);
        assert!(base_units_to_amount(U256::MAX, 18) > 1e50);
    }

    #[test]
    fn test_fixed_point_helpers() {
        assert_eq!(bps_to_fraction(U256::from(8250u64)), 0.825);
        assert_eq!(wad_to_f64(U256::from(1_600_000_000_000_000_000u128)), 1.6);
        assert_eq!(oracle_price_to_usd(U256::from(200_012_345_678u64)), 2000.12345678);
        assert_eq!(round_to(1.23456, 3), 1.235);
    }
}
