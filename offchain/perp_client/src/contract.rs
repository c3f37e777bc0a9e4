//! Contract return shapes and their conversion into engine types.
//!
//! Raw ABI records never leave this module: each decoder converts fixed-point
//! fields to decimals as soon as the bytes are decoded.

use alloy_primitives::I256;
use alloy_sol_types::SolValue;
use perp_engine::{
    margin_ratio_to_leverage, scaled6_to_decimal, sqrt_x96_to_decimal_price, x96_to_decimal,
    MarginRatios, MathError, PositionRawData,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

pub mod abi {
    alloy_sol_types::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct MarginRatios {
            uint32 min;
            uint32 max;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct PositionData {
            uint256 margin;
            int256 entryPerpDelta;
            int256 entryUsdDelta;
            MarginRatios marginRatios;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct MarketConfigData {
            MarginRatios marginRatios;
            int24 tickSpacing;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct MarketStateData {
            uint256 sqrtPriceX96;
            uint256 indexPriceX96;
            int256 fundingRateX96;
        }
    }
}

/// Per-market parameters that change rarely.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    pub margin_ratios: MarginRatios,
    pub tick_spacing: i32,
    /// Reciprocal of the minimum margin ratio.
    pub max_leverage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrices {
    pub mark_price: f64,
    pub index_price: f64,
    pub funding_rate: f64,
}

pub fn decode_position(data: &[u8]) -> Result<PositionRawData> {
    let raw = abi::PositionData::abi_decode(data, true)?;
    let margin = i128::try_from(raw.margin)
        .map_err(|_| MathError::overflow("Value too large", raw.margin))?;
    let entry_perp_delta = narrow(raw.entryPerpDelta)?;
    let entry_usd_delta = narrow(raw.entryUsdDelta)?;
    if entry_perp_delta.signum() != entry_usd_delta.signum() {
        warn!(entry_perp_delta, entry_usd_delta, "position deltas disagree in sign");
        return Err(ClientError::Malformed(format!(
            "entry deltas disagree: perp {entry_perp_delta}, usd {entry_usd_delta}"
        )));
    }
    let position = PositionRawData {
        margin: scaled6_to_decimal(margin),
        entry_perp_delta,
        entry_usd_delta,
        margin_ratios: ratios(&raw.marginRatios),
    };
    debug!(?position, "decoded position");
    Ok(position)
}

/// Like [`decode_position`], for a hex payload with or without `0x`.
pub fn decode_position_hex(payload: &str) -> Result<PositionRawData> {
    let payload = payload.trim();
    let bytes = hex::decode(payload.strip_prefix("0x").unwrap_or(payload))?;
    decode_position(&bytes)
}

pub fn decode_market_config(data: &[u8]) -> Result<MarketConfig> {
    let raw = abi::MarketConfigData::abi_decode(data, true)?;
    let margin_ratios = ratios(&raw.marginRatios);
    if margin_ratios.min > margin_ratios.max {
        return Err(ClientError::Malformed(format!(
            "min margin ratio {} above max {}",
            margin_ratios.min, margin_ratios.max
        )));
    }
    if raw.tickSpacing <= 0 {
        return Err(ClientError::Malformed(format!("tick spacing {}", raw.tickSpacing)));
    }
    Ok(MarketConfig {
        margin_ratios,
        tick_spacing: raw.tickSpacing,
        max_leverage: margin_ratio_to_leverage(margin_ratios.min)?,
    })
}

pub fn decode_market_prices(data: &[u8]) -> Result<MarketPrices> {
    let raw = abi::MarketStateData::abi_decode(data, true)?;
    let index_x96 = I256::try_from(raw.indexPriceX96)
        .map_err(|_| MathError::overflow("Value too large", raw.indexPriceX96))?;
    Ok(MarketPrices {
        mark_price: sqrt_x96_to_decimal_price(raw.sqrtPriceX96)?,
        index_price: x96_to_decimal(index_x96)?,
        funding_rate: x96_to_decimal(raw.fundingRateX96)?,
    })
}

fn narrow(value: I256) -> std::result::Result<i128, MathError> {
    i128::try_from(value).map_err(|_| MathError::overflow("Value too large", value))
}

fn ratios(raw: &abi::MarginRatios) -> MarginRatios {
    MarginRatios { min: raw.min, max: raw.max }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use alloy_primitives::U256;

    pub fn position(margin_scaled: u64, perp: i128, usd: i128, ratios: MarginRatios) -> Vec<u8> {
        abi::PositionData {
            margin: U256::from(margin_scaled),
            entryPerpDelta: I256::unchecked_from(perp),
            entryUsdDelta: I256::unchecked_from(usd),
            marginRatios: abi::MarginRatios { min: ratios.min, max: ratios.max },
        }
        .abi_encode()
    }

    pub fn market_config(min: u32, max: u32, tick_spacing: i32) -> Vec<u8> {
        abi::MarketConfigData { marginRatios: abi::MarginRatios { min, max }, tickSpacing: tick_spacing }
            .abi_encode()
    }

    pub fn market_state(sqrt_price_x96: U256, index_price_x96: U256, funding_rate_x96: I256) -> Vec<u8> {
        abi::MarketStateData {
            sqrtPriceX96: sqrt_price_x96,
            indexPriceX96: index_price_x96,
            fundingRateX96: funding_rate_x96,
        }
        .abi_encode()
    }
}
