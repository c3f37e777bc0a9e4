use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Input violates a precondition of the conversion.
    #[error("invalid argument: {reason} (got {value})")]
    InvalidArgument { reason: &'static str, value: String },
    /// A derived magnitude left the safe-decimal range.
    #[error("overflow: {reason} (got {value})")]
    Overflow { reason: &'static str, value: String },
}

impl MathError {
    pub fn invalid(reason: &'static str, value: impl ToString) -> Self {
        Self::InvalidArgument { reason, value: value.to_string() }
    }

    pub fn overflow(reason: &'static str, value: impl ToString) -> Self {
        Self::Overflow { reason, value: value.to_string() }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidArgument { reason, .. } | Self::Overflow { reason, .. } => reason,
        }
    }
}

pub type MathResult<T> = Result<T, MathError>;
