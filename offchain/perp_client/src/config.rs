//! Environment configuration.

use std::{env, time::Duration};

use alloy_primitives::Address;
use serde::Serialize;

use crate::error::{ClientError, Result};

/// Arbitrum Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 421_614;
pub const DEFAULT_CONFIG_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientConfig {
    pub chain_id: u64,
    pub contract_address: Option<Address>,
    /// How long market configuration stays cached.
    pub config_cache_ttl_secs: u64,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            contract_address: None,
            config_cache_ttl_secs: DEFAULT_CONFIG_CACHE_TTL_SECS,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let chain_id = match lookup("CHAIN_ID") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("CHAIN_ID is not an integer: {v:?}")))?,
            None => defaults.chain_id,
        };
        let contract_address = lookup("CONTRACT_ADDRESS")
            .map(|v| {
                v.trim().parse::<Address>().map_err(|_| {
                    ClientError::Config(format!("CONTRACT_ADDRESS is not an address: {v:?}"))
                })
            })
            .transpose()?;
        let config_cache_ttl_secs = match lookup("CONFIG_CACHE_TTL_SECS") {
            Some(v) => v.trim().parse().map_err(|_| {
                ClientError::Config(format!("CONFIG_CACHE_TTL_SECS is not an integer: {v:?}"))
            })?,
            None => defaults.config_cache_ttl_secs,
        };
        let log_filter = lookup("RUST_LOG").unwrap_or(defaults.log_filter);
        Ok(Self { chain_id, contract_address, config_cache_ttl_secs, log_filter })
    }

    pub fn validate(&self) -> Result<()> {
        if self.config_cache_ttl_secs == 0 {
            return Err(ClientError::Config("CONFIG_CACHE_TTL_SECS must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn config_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_cache_ttl_secs)
    }
}
