//! Historical market snapshots from the indexing service.
//!
//! Rows carry X96 integers as decimal strings; they are parsed into 256-bit
//! integers and descaled on receipt.

use alloy_primitives::I256;
use perp_engine::x96_to_decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub timestamp: u64,
    pub mark_price_x96: String,
    pub index_price_x96: String,
    pub funding_rate_x96: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub timestamp: u64,
    pub mark_price: f64,
    pub index_price: f64,
    pub funding_rate: f64,
}

impl MarketSnapshot {
    pub fn from_raw(raw: &RawSnapshot) -> Result<Self> {
        Ok(Self {
            timestamp: raw.timestamp,
            mark_price: parse_x96("markPriceX96", &raw.mark_price_x96)?,
            index_price: parse_x96("indexPriceX96", &raw.index_price_x96)?,
            funding_rate: parse_x96("fundingRateX96", &raw.funding_rate_x96)?,
        })
    }

    /// Mark over index, as a fraction of index.
    pub fn premium(&self) -> Option<f64> {
        (self.index_price != 0.0).then(|| (self.mark_price - self.index_price) / self.index_price)
    }
}

fn parse_x96(field: &'static str, value: &str) -> Result<f64> {
    let parsed = I256::from_dec_str(value.trim())
        .map_err(|_| ClientError::ParseInt { field, value: value.to_string() })?;
    Ok(x96_to_decimal(parsed)?)
}

/// Decode a JSON array of snapshots, oldest first.
pub fn parse_snapshots(json: &str) -> Result<Vec<MarketSnapshot>> {
    let rows: Vec<RawSnapshot> = serde_json::from_str(json)?;
    let mut out = rows.iter().map(MarketSnapshot::from_raw).collect::<Result<Vec<_>>>()?;
    out.sort_by_key(|s| s.timestamp);
    Ok(out)
}
