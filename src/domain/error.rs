//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::AmountError;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid amount (zero, negative, malformed, or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Unknown mobile-money provider
    #[error("Unsupported mobile-money provider: {0}")]
    InvalidMobileProvider(String),

    /// Malformed mobile-money number
    #[error("Invalid mobile-money number: {0}")]
    InvalidMobileNumber(String),

    /// Processing a withdrawal requires the mobile-money transaction id
    #[error("A processed withdrawal requires a transaction id")]
    MissingTransactionId,

    /// A stored status column did not parse; indicates data corruption
    #[error("Unknown {entity} status in storage: {value}")]
    UnknownStatus { entity: &'static str, value: String },
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

impl DomainError {
    /// Check if this is a client error (malformed input) rather than a
    /// storage consistency problem.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::UnknownStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_error_converts() {
        let err: DomainError = AmountError::NotPositive(rust_decimal::Decimal::ZERO).into();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unknown_status_is_not_client_error() {
        let err = DomainError::UnknownStatus {
            entity: "payment",
            value: "weird".to_string(),
        };
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("payment"));
    }
}
