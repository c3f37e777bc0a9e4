//! Fixed-point conversions and position metrics for the perp protocol.
//!
//! [`convert`] bridges decimal values and the on-chain encodings (Q96
//! sqrt-prices, X96 values, 6-decimal amounts, ticks, margin ratios).
//! [`position`] derives entry price, size, value, leverage and liquidation
//! price from a position's raw entry deltas.

pub mod convert;
pub mod error;
pub mod position;
pub mod types;

pub use convert::*;
pub use error::{MathError, MathResult};
pub use position::*;
pub use types::*;
