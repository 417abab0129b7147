use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Arbitrage violation: risk-neutral up-probability {risk_neutral_prob} — {reason}")]
    ArbitrageViolation {
        risk_neutral_prob: Decimal,
        reason: String,
    },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::SerializationError(e.to_string())
    }
}
