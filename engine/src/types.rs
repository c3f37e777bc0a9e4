use serde::{Deserialize, Serialize};

/// Fraction scaled by 1e6 (100_000 = 10%).
pub type MarginRatio = u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side { Long, Short }

impl Side {
    /// Direction implied by a signed perp delta; `None` when flat.
    pub fn from_perp_delta(delta: i128) -> Option<Self> {
        match delta.signum() {
            1 => Some(Side::Long),
            -1 => Some(Side::Short),
            _ => None,
        }
    }

    pub fn is_long(self) -> bool { matches!(self, Side::Long) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarginRatios {
    pub min: MarginRatio,
    pub max: MarginRatio,
}

/// Opening state of a maker or taker position as stored on-chain.
///
/// Both deltas are 6-decimal scaled and share a sign: positive for long,
/// negative for short, both zero for a flat position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionRawData {
    pub margin: f64,
    pub entry_perp_delta: i128,
    pub entry_usd_delta: i128,
    pub margin_ratios: MarginRatios,
}

impl PositionRawData {
    pub fn is_flat(&self) -> bool {
        self.entry_perp_delta == 0
    }
}
