//! Derived metrics over a position's raw entry deltas.
//!
//! Everything here works in already-scaled space: deltas are 6-decimal
//! integers, prices and margin are decimals.

use serde::Serialize;

use crate::convert::{scaled6_to_decimal, SCALE_6_F64};
use crate::types::{PositionRawData, Side};

/// `|usd delta| / |perp delta|`; the 1e6 scaling cancels. Zero when flat.
pub fn entry_price(raw: &PositionRawData) -> f64 {
    if raw.entry_perp_delta == 0 {
        return 0.0;
    }
    raw.entry_usd_delta.unsigned_abs() as f64 / raw.entry_perp_delta.unsigned_abs() as f64
}

/// Signed size in perp units: positive long, negative short.
pub fn position_size(raw: &PositionRawData) -> f64 {
    scaled6_to_decimal(raw.entry_perp_delta)
}

pub fn position_value(raw: &PositionRawData, mark_price: f64) -> f64 {
    position_size(raw).abs() * mark_price
}

/// `+inf` when the margin is gone (zero or negative), never an error.
pub fn leverage(position_value: f64, effective_margin: f64) -> f64 {
    if effective_margin > 0.0 {
        position_value / effective_margin
    } else {
        f64::INFINITY
    }
}

/// Price at which the margin left over the minimum maintenance requirement
/// (taken on entry notional) is used up. `None` for flat or unfunded
/// positions.
///
/// Longs are floored at zero. Shorts have no upper bound and are left
/// unclamped. `mark_price` does not enter the formula.
pub fn liquidation_price(raw: &PositionRawData, _mark_price: f64, is_long: bool) -> Option<f64> {
    let size = position_size(raw).abs();
    if size == 0.0 || raw.margin <= 0.0 {
        return None;
    }
    let entry = entry_price(raw);
    let entry_notional = size * entry;
    let min_margin_ratio = raw.margin_ratios.min as f64 / SCALE_6_F64;
    let cushion = (raw.margin - min_margin_ratio * entry_notional) / size;
    if is_long {
        Some((entry - cushion).max(0.0))
    } else {
        Some(entry + cushion)
    }
}

pub fn unrealized_pnl(raw: &PositionRawData, mark_price: f64) -> f64 {
    if raw.is_flat() {
        return 0.0;
    }
    position_size(raw) * (mark_price - entry_price(raw))
}

/// Margin plus unrealized PnL; negative once the position is insolvent.
pub fn effective_margin(raw: &PositionRawData, mark_price: f64) -> f64 {
    raw.margin + unrealized_pnl(raw, mark_price)
}

pub fn is_liquidatable(raw: &PositionRawData, mark_price: f64) -> bool {
    if raw.is_flat() {
        return false;
    }
    let maintenance = raw.margin_ratios.min as f64 / SCALE_6_F64 * position_value(raw, mark_price);
    effective_margin(raw, mark_price) < maintenance
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    pub side: Option<Side>,
    pub size: f64,
    pub entry_price: f64,
    pub mark_price: f64,
    pub value: f64,
    pub unrealized_pnl: f64,
    pub effective_margin: f64,
    /// Serialized as `null` when infinite.
    pub leverage: f64,
    pub liquidation_price: Option<f64>,
    pub liquidatable: bool,
}

impl PositionMetrics {
    pub fn compute(raw: &PositionRawData, mark_price: f64) -> Self {
        let side = Side::from_perp_delta(raw.entry_perp_delta);
        let value = position_value(raw, mark_price);
        let effective = effective_margin(raw, mark_price);
        Self {
            side,
            size: position_size(raw),
            entry_price: entry_price(raw),
            mark_price,
            value,
            unrealized_pnl: unrealized_pnl(raw, mark_price),
            effective_margin: effective,
            leverage: leverage(value, effective),
            liquidation_price: side
                .and_then(|s| liquidation_price(raw, mark_price, s.is_long())),
            liquidatable: is_liquidatable(raw, mark_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarginRatios;

    fn raw(margin: f64, perp: i128, usd: i128, min_ratio: u32) -> PositionRawData {
        PositionRawData {
            margin,
            entry_perp_delta: perp,
            entry_usd_delta: usd,
            margin_ratios: MarginRatios { min: min_ratio, max: 1_000_000 },
        }
    }

    #[test]
    fn test_entry_price_sign_invariant() {
        let long = raw(100.0, 1_000_000, 50_000_000, 100_000);
        let short = raw(100.0, -1_000_000, -50_000_000, 100_000);
        assert_eq!(entry_price(&long), 50.0);
        assert_eq!(entry_price(&short), 50.0);
        assert_eq!(entry_price(&raw(100.0, 0, 0, 100_000)), 0.0);
    }

    #[test]
    fn test_size_and_value() {
        let short = raw(100.0, -2_500_000, -125_000_000, 100_000);
        assert_eq!(position_size(&short), -2.5);
        assert_eq!(position_value(&short, 40.0), 100.0);
        assert_eq!(position_size(&raw(0.0, 0, 0, 0)), 0.0);
    }

    #[test]
    fn test_leverage_infinite_without_margin() {
        assert_eq!(leverage(1000.0, 250.0), 4.0);
        assert_eq!(leverage(1000.0, 0.0), f64::INFINITY);
        assert_eq!(leverage(1000.0, -5.0), f64::INFINITY);
    }

    #[test]
    fn test_long_liquidation_clamped_at_zero() {
        let long = raw(1000.0, 1_000_000, 10_000_000, 100_000);
        assert_eq!(liquidation_price(&long, 10.0, true), Some(0.0));
    }

    #[test]
    fn test_long_liquidation_below_entry() {
        // entry 100, size 2, margin 30, mmr 5%: 100 - (30 - 10) / 2 = 90
        let long = raw(30.0, 2_000_000, 200_000_000, 50_000);
        assert_eq!(liquidation_price(&long, 100.0, true), Some(90.0));
    }

    #[test]
    fn test_short_liquidation_unclamped() {
        let short = raw(100.0, -1_000_000, -50_000_000, 100_000);
        let liq = liquidation_price(&short, 50.0, false).unwrap();
        assert!(liq > 50.0);
        assert_eq!(liq, 145.0);
    }

    #[test]
    fn test_liquidation_undefined_for_flat_or_unfunded() {
        assert_eq!(liquidation_price(&raw(1000.0, 0, 0, 100_000), 10.0, true), None);
        assert_eq!(liquidation_price(&raw(0.0, 1_000_000, 10_000_000, 100_000), 10.0, true), None);
        assert_eq!(liquidation_price(&raw(-1.0, -1_000_000, -10_000_000, 100_000), 10.0, false), None);
    }

    #[test]
    fn test_pnl_long_gain() {
        let long = raw(1000.0, 1_000_000, 100_000_000, 100_000);
        assert_eq!(unrealized_pnl(&long, 110.0), 10.0);
        assert_eq!(effective_margin(&long, 110.0), 1010.0);
    }

    #[test]
    fn test_pnl_short_loss() {
        let short = raw(100.0, -1_000_000, -50_000_000, 100_000);
        assert_eq!(unrealized_pnl(&short, 60.0), -10.0);
        assert!(!is_liquidatable(&short, 60.0));
        assert!(is_liquidatable(&short, 145.0));
        assert!(!is_liquidatable(&raw(0.0, 0, 0, 100_000), 145.0));
    }

    #[test]
    fn test_metrics_bundle() {
        let long = raw(1000.0, 1_000_000, 100_000_000, 100_000);
        let m = PositionMetrics::compute(&long, 110.0);
        assert_eq!(m.side, Some(Side::Long));
        assert_eq!(m.value, 110.0);
        assert_eq!(m.leverage, 110.0 / 1010.0);
        assert_eq!(m.liquidation_price, Some(0.0));
        assert!(!m.liquidatable);

        let flat = PositionMetrics::compute(&raw(50.0, 0, 0, 100_000), 110.0);
        assert_eq!(flat.side, None);
        assert_eq!(flat.liquidation_price, None);
        let json = serde_json::to_value(flat).unwrap();
        assert_eq!(json["liquidationPrice"], serde_json::Value::Null);
        assert_eq!(json["effectiveMargin"], 50.0);
    }
}
