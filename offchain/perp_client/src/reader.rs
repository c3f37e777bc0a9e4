//! Typed reads on top of an external contract source.

use std::time::Duration;

use perp_engine::{PositionMetrics, PositionRawData};
use tracing::debug;

use crate::cache::{ConfigCache, TtlCache};
use crate::config::ClientConfig;
use crate::contract::{
    decode_market_config, decode_market_prices, decode_position, MarketConfig, MarketPrices,
};
use crate::error::Result;

pub type MarketId = u64;
pub type PositionId = u64;

/// Raw ABI return data from the chain. Transport, signing and retries live
/// with the implementor.
pub trait ContractSource {
    fn position_data(&self, position_id: PositionId) -> Result<Vec<u8>>;
    fn market_config(&self, market_id: MarketId) -> Result<Vec<u8>>;
    fn market_state(&self, market_id: MarketId) -> Result<Vec<u8>>;
}

pub struct PerpReader<S, C = TtlCache<MarketId, MarketConfig>> {
    source: S,
    configs: C,
}

impl<S: ContractSource> PerpReader<S> {
    pub fn new(source: S, config_ttl: Duration) -> Self {
        Self::with_cache(source, TtlCache::new(config_ttl))
    }

    /// Reader whose config cache uses the configured TTL.
    pub fn from_config(source: S, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!(chain_id = config.chain_id, ttl_secs = config.config_cache_ttl_secs, "building reader");
        Ok(Self::new(source, config.config_cache_ttl()))
    }
}

impl<S, C> PerpReader<S, C>
where
    S: ContractSource,
    C: ConfigCache<MarketId, MarketConfig>,
{
    pub fn with_cache(source: S, configs: C) -> Self {
        Self { source, configs }
    }

    /// Market configuration, served from cache while fresh.
    pub fn market_config(&self, market_id: MarketId) -> Result<MarketConfig> {
        if let Some(cfg) = self.configs.get(&market_id) {
            return Ok(cfg);
        }
        let cfg = decode_market_config(&self.source.market_config(market_id)?)?;
        debug!(market_id, max_leverage = cfg.max_leverage, "fetched market config");
        self.configs.put(market_id, cfg);
        Ok(cfg)
    }

    pub fn market_prices(&self, market_id: MarketId) -> Result<MarketPrices> {
        decode_market_prices(&self.source.market_state(market_id)?)
    }

    pub fn position(&self, position_id: PositionId) -> Result<PositionRawData> {
        decode_position(&self.source.position_data(position_id)?)
    }

    pub fn position_metrics(
        &self,
        position_id: PositionId,
        market_id: MarketId,
    ) -> Result<PositionMetrics> {
        let position = self.position(position_id)?;
        let prices = self.market_prices(market_id)?;
        Ok(PositionMetrics::compute(&position, prices.mark_price))
    }

    pub fn invalidate_configs(&self) {
        self.configs.clear();
    }
}
