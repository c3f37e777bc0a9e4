//! Translate user-facing decimal inputs into contract call arguments.

use alloy_primitives::{I256, U256};
use perp_engine::{decimal_price_to_sqrt_x96, decimal_price_to_tick, decimal_to_scaled6, decimal_to_x96};
use serde::{Deserialize, Serialize};

use crate::contract::MarketConfig;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenTakerIntent {
    pub margin: f64,
    pub leverage: f64,
    pub is_long: bool,
    /// Worst acceptable price, if any.
    pub price_limit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenTakerArgs {
    pub margin: i128,
    pub leverage_x96: I256,
    pub is_long: bool,
    pub sqrt_price_limit_x96: Option<U256>,
}

impl OpenTakerIntent {
    pub fn to_args(&self, market: &MarketConfig) -> Result<OpenTakerArgs> {
        let margin = positive_margin(self.margin)?;
        if !(self.leverage > 0.0) {
            return Err(ClientError::intent("Leverage must be positive", self.leverage));
        }
        if self.leverage > market.max_leverage {
            return Err(ClientError::intent("Leverage exceeds market maximum", self.leverage));
        }
        Ok(OpenTakerArgs {
            margin,
            leverage_x96: decimal_to_x96(self.leverage)?,
            is_long: self.is_long,
            sqrt_price_limit_x96: self.price_limit.map(decimal_price_to_sqrt_x96).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenMakerIntent {
    pub margin: f64,
    pub price_lower: f64,
    pub price_upper: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenMakerArgs {
    pub margin: i128,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl OpenMakerIntent {
    /// Range ticks are widened outward onto the market's tick spacing.
    pub fn to_args(&self, market: &MarketConfig) -> Result<OpenMakerArgs> {
        let margin = positive_margin(self.margin)?;
        if !(self.price_lower < self.price_upper) {
            return Err(ClientError::intent(
                "Price range is empty",
                format!("{}..{}", self.price_lower, self.price_upper),
            ));
        }
        let spacing = market.tick_spacing;
        if spacing <= 0 {
            return Err(ClientError::intent("Tick spacing must be positive", spacing));
        }
        let lower = decimal_price_to_tick(self.price_lower, true)?.div_euclid(spacing) * spacing;
        let upper = -(-decimal_price_to_tick(self.price_upper, false)?).div_euclid(spacing) * spacing;
        if lower >= upper {
            return Err(ClientError::intent("Price range is empty", format!("{lower}..{upper}")));
        }
        Ok(OpenMakerArgs { margin, tick_lower: lower, tick_upper: upper })
    }
}

/// Signed margin change: positive deposits, negative withdraws.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct AdjustMarginIntent {
    pub delta: f64,
}

impl AdjustMarginIntent {
    pub fn to_scaled(&self) -> Result<i128> {
        Ok(decimal_to_scaled6(self.delta)?)
    }
}

fn positive_margin(margin: f64) -> Result<i128> {
    if !(margin > 0.0) {
        return Err(ClientError::intent("Margin must be positive", margin));
    }
    Ok(decimal_to_scaled6(margin)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use perp_engine::{MarginRatios, Q96};

    fn market(min_ratio: u32, tick_spacing: i32) -> MarketConfig {
        MarketConfig {
            margin_ratios: MarginRatios { min: min_ratio, max: 1_000_000 },
            tick_spacing,
            max_leverage: 1_000_000.0 / min_ratio as f64,
        }
    }

    #[test]
    fn test_open_taker_two_x() {
        let intent = OpenTakerIntent { margin: 100.0, leverage: 2.0, is_long: true, price_limit: Some(50.0) };
        let args = intent.to_args(&market(100_000, 60)).unwrap();
        assert_eq!(args.margin, 100_000_000);
        assert_eq!(args.leverage_x96, I256::from_raw(Q96 * U256::from(2u8)));
        assert_eq!(args.sqrt_price_limit_x96, Some(decimal_price_to_sqrt_x96(50.0).unwrap()));
    }

    #[test]
    fn test_open_taker_rejects_bad_inputs() {
        let m = market(100_000, 60);
        let base = OpenTakerIntent { margin: 100.0, leverage: 2.0, is_long: false, price_limit: None };

        let err = OpenTakerIntent { margin: -5.0, ..base }.to_args(&m).unwrap_err();
        assert!(matches!(err, ClientError::InvalidIntent { reason: "Margin must be positive", .. }));

        let err = OpenTakerIntent { leverage: 20.0, ..base }.to_args(&m).unwrap_err();
        assert!(matches!(err, ClientError::InvalidIntent { reason: "Leverage exceeds market maximum", .. }));

        let err = OpenTakerIntent { price_limit: Some(0.0), ..base }.to_args(&m).unwrap_err();
        assert!(matches!(err, ClientError::Math(_)));

        assert!(base.to_args(&m).unwrap().sqrt_price_limit_x96.is_none());
    }

    #[test]
    fn test_open_maker_snaps_outward() {
        let intent = OpenMakerIntent { margin: 10.0, price_lower: 0.9, price_upper: 1.1 };
        let args = intent.to_args(&market(100_000, 60)).unwrap();
        // raw ticks -1054 and 954
        assert_eq!(args.tick_lower, -1080);
        assert_eq!(args.tick_upper, 960);
        assert_eq!(args.margin, 10_000_000);

        let unit = intent.to_args(&market(100_000, 1)).unwrap();
        assert_eq!((unit.tick_lower, unit.tick_upper), (-1054, 954));
    }

    #[test]
    fn test_open_maker_empty_range() {
        let intent = OpenMakerIntent { margin: 10.0, price_lower: 1.1, price_upper: 0.9 };
        assert!(intent.to_args(&market(100_000, 60)).is_err());
    }

    #[test]
    fn test_adjust_margin_keeps_sign() {
        assert_eq!(AdjustMarginIntent { delta: -12.5 }.to_scaled().unwrap(), -12_500_000);
        assert_eq!(AdjustMarginIntent { delta: 3.0 }.to_scaled().unwrap(), 3_000_000);
    }
}
