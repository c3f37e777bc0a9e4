//! Conversions between human decimal values and the protocol's on-chain
//! fixed-point encodings: Q96 sqrt-prices, X96 values, 6-decimal amounts,
//! ticks and margin ratios.
//!
//! Every X96/Q96 intermediate is carried in 256-bit integers with checked
//! multiplication. A product that does not fit in 256 bits is already far
//! beyond the safe-decimal range, so reporting it as [`MathError::Overflow`]
//! gives the same answer an unbounded integer would.

use alloy_primitives::{Sign, I256, U256};

use crate::error::{MathError, MathResult};
use crate::types::MarginRatio;

/// 2^96, the fixed-point normalization constant.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// 10^6, the stablecoin precision used for amounts and margin ratios.
pub const SCALE_6: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);
pub const SCALE_6_F64: f64 = 1_000_000.0;

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;
pub const MAX_SAFE_DECIMAL: f64 = MAX_SAFE_INTEGER as f64;

/// `price = TICK_BASE^tick`
pub const TICK_BASE: f64 = 1.0001;

/// Encode a decimal price as a Q96 sqrt-price.
///
/// The square root is floored to 6 decimals before being promoted to the
/// 2^96 domain: `floor(sqrt(price) * 1e6) * 2^96 / 1e6`. Large prices lose
/// precision to that intermediate step.
pub fn decimal_price_to_sqrt_x96(price: f64) -> MathResult<U256> {
    if !(price > 0.0) {
        return Err(MathError::invalid("Price must be positive", price));
    }
    if price > MAX_SAFE_DECIMAL {
        return Err(MathError::invalid("Price too large", price));
    }
    let sqrt_scaled = (price.sqrt() * SCALE_6_F64).floor() as u64;
    Ok(U256::from(sqrt_scaled) * Q96 / SCALE_6)
}

/// Decode a Q96 sqrt-price into a decimal price. Zero maps to zero.
pub fn sqrt_x96_to_decimal_price(sqrt_price_x96: U256) -> MathResult<f64> {
    if sqrt_price_x96.is_zero() {
        return Ok(0.0);
    }
    let squared = sqrt_price_x96
        .checked_mul(sqrt_price_x96)
        .ok_or_else(|| MathError::overflow("Value too large", sqrt_price_x96))?;
    let price_x96 = squared / Q96;
    descale_x96(price_x96, false).ok_or_else(|| MathError::overflow("Value too large", sqrt_price_x96))
}

/// `floor(amount * 1e6)`.
///
/// Only the upper bound is checked. Negative amounts are accepted and yield
/// negative integers, since signed on-chain deltas go through here. Callers
/// that need a positive amount validate that themselves.
pub fn decimal_to_scaled6(amount: f64) -> MathResult<i128> {
    if amount.is_nan() {
        return Err(MathError::invalid("Amount must be a number", amount));
    }
    if amount > MAX_SAFE_DECIMAL / SCALE_6_F64 {
        return Err(MathError::invalid("Amount too large", amount));
    }
    let scaled = (amount * SCALE_6_F64).floor();
    // `as` would saturate at i128::MIN
    if scaled < i128::MIN as f64 {
        return Err(MathError::overflow("Value too large", amount));
    }
    Ok(scaled as i128)
}

pub fn scaled6_to_decimal(value: i128) -> f64 {
    value as f64 / SCALE_6_F64
}

/// `decimal_to_scaled6(amount) * 2^96 / 1e6`, truncated toward zero.
pub fn decimal_to_x96(amount: f64) -> MathResult<I256> {
    let scaled = decimal_to_scaled6(amount)?;
    let magnitude = U256::from(scaled.unsigned_abs()) * Q96 / SCALE_6;
    let sign = if scaled < 0 { Sign::Negative } else { Sign::Positive };
    I256::checked_from_sign_and_abs(sign, magnitude)
        .ok_or_else(|| MathError::overflow("Value too large", amount))
}

/// `value * 1e6 / 2^96`, range-checked, then divided by 1e6.
///
/// The range check runs on the scaled intermediate, after the
/// multiplication.
pub fn x96_to_decimal(value_x96: I256) -> MathResult<f64> {
    descale_x96(value_x96.unsigned_abs(), value_x96.is_negative())
        .ok_or_else(|| MathError::overflow("Value too large", value_x96))
}

/// Shared tail of the X96 decoders. `None` when the 6-decimal intermediate
/// leaves the safe range.
fn descale_x96(magnitude: U256, negative: bool) -> Option<f64> {
    let scaled = magnitude.checked_mul(SCALE_6)? / Q96;
    if scaled > U256::from(MAX_SAFE_INTEGER) {
        return None;
    }
    let scaled = u64::try_from(scaled).ok()?;
    let value = scaled as f64 / SCALE_6_F64;
    Some(if negative { -value } else { value })
}

/// `log(price) / log(1.0001)`, floored when `round_down`, ceiled otherwise.
///
/// Float logs can land one tick off near a boundary.
pub fn decimal_price_to_tick(price: f64, round_down: bool) -> MathResult<i32> {
    if !(price > 0.0) {
        return Err(MathError::invalid("Price must be positive", price));
    }
    if !price.is_finite() {
        return Err(MathError::invalid("Price too large", price));
    }
    let raw = price.ln() / TICK_BASE.ln();
    let tick = if round_down { raw.floor() } else { raw.ceil() };
    Ok(tick as i32)
}

pub fn tick_to_decimal_price(tick: i32) -> f64 {
    TICK_BASE.powi(tick)
}

/// Leverage is the reciprocal of the margin ratio: `1e6 / margin_ratio`.
pub fn margin_ratio_to_leverage(margin_ratio: MarginRatio) -> MathResult<f64> {
    if margin_ratio == 0 {
        return Err(MathError::invalid("Margin ratio must be greater than 0", margin_ratio));
    }
    Ok(SCALE_6_F64 / margin_ratio as f64)
}

/// `floor(1e6 / leverage)`
pub fn leverage_to_margin_ratio(leverage: f64) -> MathResult<MarginRatio> {
    if !(leverage > 0.0) {
        return Err(MathError::invalid("Leverage must be positive", leverage));
    }
    let ratio = (SCALE_6_F64 / leverage).floor();
    if ratio > MarginRatio::MAX as f64 {
        return Err(MathError::invalid("Leverage too small", leverage));
    }
    Ok(ratio as MarginRatio)
}
