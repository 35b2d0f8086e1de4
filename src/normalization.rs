// src/normalization.rs
//
// Fixed-point normalization of raw reserves into human-scale quantities, plus the
// reserve-ratio price used by every liquidity report.

use crate::types::ConversionError;
use ethers::types::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Digits a `Decimal` can hold without losing its integer part.
const MAX_DECIMAL_DIGITS: usize = 28;

/// Largest exponent for which `10^n` still fits in a U256.
const MAX_TOKEN_DECIMALS: u8 = 77;

/// 10^n as U256, or an error when the token claims more decimals than U256 can scale.
pub fn pow10_u256(n: u8) -> Result<U256, ConversionError> {
    if n > MAX_TOKEN_DECIMALS {
        return Err(ConversionError::UnsupportedDecimals(n));
    }
    Ok(U256::exp10(n as usize))
}

/// Exact decimal rendering of a base-unit amount, scaled by the token's own decimals.
///
/// Trailing fractional zeros are trimmed, but at least one fractional digit is kept
/// (`5_000_000` with 6 decimals renders as `"5.0"`).
pub fn format_units(raw: U256, decimals: u8) -> Result<String, ConversionError> {
    if decimals == 0 {
        return Ok(format!("{raw}.0"));
    }
    let scale = pow10_u256(decimals)?;
    let (whole, frac) = raw.div_mod(scale);
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        Ok(format!("{whole}.0"))
    } else {
        Ok(format!("{whole}.{frac}"))
    }
}

/// Normalize a base-unit amount into a human-scale Decimal.
///
/// Fractional digits beyond what a `Decimal` can carry are truncated. An integer
/// part wider than 28 digits is reported as `ConversionError::Overflow`.
pub fn normalize_amount(raw: U256, decimals: u8) -> Result<Decimal, ConversionError> {
    let text = format_units(raw, decimals)?;
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if int_part.len() > MAX_DECIMAL_DIGITS {
        return Err(ConversionError::Overflow);
    }
    let room = MAX_DECIMAL_DIGITS - int_part.len();
    let frac = &frac_part[..frac_part.len().min(room)];
    let truncated = if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac}")
    };
    Decimal::from_str(&truncated).map_err(|e| ConversionError::InvalidDecimal(e.to_string()))
}

/// Price of one target token expressed in counter-asset units: `counter / target`.
///
/// Returns `None` when the target reserve is zero. A quotient outside the Decimal
/// range is also reported as `None` instead of panicking.
pub fn price_in_counter(target_reserve: Decimal, counter_reserve: Decimal) -> Option<Decimal> {
    if target_reserve.is_zero() {
        return None;
    }
    counter_reserve.checked_div(target_reserve)
}

/// Total value locked in the pair measured in counter-asset units.
///
/// Both sides of a constant-product pair hold equal value, so the pair is worth
/// twice its counter reserve.
pub fn pool_value_in_counter(counter_reserve: Decimal) -> Option<Decimal> {
    counter_reserve.checked_mul(Decimal::TWO)
}

/// Rough USD estimate of a pair's liquidity given a USD price for the counter-asset.
pub fn estimate_usd_value(counter_reserve: Decimal, counter_usd_price: Decimal) -> Option<Decimal> {
    pool_value_in_counter(counter_reserve)?.checked_mul(counter_usd_price)
}

/// Display helper used by reports: `N/A` when the price is unavailable.
pub fn display_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => p.normalize().to_string(),
        None => "N/A".to_string(),
    }
}
