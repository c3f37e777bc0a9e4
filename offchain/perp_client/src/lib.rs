//! Off-chain side of the perp client: contract return shapes, a cached
//! reader over an external contract source, indexer snapshot decoding and
//! call-argument builders. All numeric work is delegated to `perp_engine`.

pub mod cache;
pub mod config;
pub mod contract;
pub mod error;
pub mod intents;
pub mod reader;
pub mod snapshot;

pub use error::{ClientError, Result};
