use perp_engine::MathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("abi decode failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid integer in {field}: {value:?}")]
    ParseInt { field: &'static str, value: String },
    #[error("malformed contract data: {0}")]
    Malformed(String),
    #[error("invalid intent: {reason} (got {value})")]
    InvalidIntent { reason: &'static str, value: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("contract source failed: {0}")]
    Source(String),
}

impl ClientError {
    pub(crate) fn intent(reason: &'static str, value: impl ToString) -> Self {
        Self::InvalidIntent { reason, value: value.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
