//! Error types for the Zapway audit engine
//!
//! Verification failures are part of the audit trail, so every error carries
//! enough context to be shown to the operator verbatim.

use std::fmt;
use std::error::Error as StdError;

/// Root error type for all audit operations
#[derive(Debug)]
pub enum AuditError {
    /// Configuration related errors
    Configuration(ConfigurationError),

    /// Seed-stream derivation and game resolution errors
    Verification(VerificationError),

    /// I/O failures outside configuration loading (binding sockets, etc.)
    Io(std::io::Error),
}

/// Configuration and validation errors
#[derive(Debug)]
pub enum ConfigurationError {
    ValidationFailed(String),
    InvalidValue { field: String, value: String, reason: String },
    LoadFailed(String),
    SaveFailed(String),
}

/// Failure reported by the injected hash primitive
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CryptoError(pub String);

/// Errors surfaced by a verification run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("Cryptographic engine failure: {0}")]
    CryptoEngineUnavailable(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("A verification is already in progress")]
    Busy,
}

impl VerificationError {
    pub fn invalid(field: &str, value: impl ToString, reason: &str) -> Self {
        VerificationError::InvalidParameter {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<CryptoError> for VerificationError {
    fn from(e: CryptoError) -> Self {
        VerificationError::CryptoEngineUnavailable(e.0)
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AuditError::Verification(e) => write!(f, "Verification error: {}", e),
            AuditError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
            ConfigurationError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
            ConfigurationError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
            ConfigurationError::SaveFailed(msg) => write!(f, "Failed to save configuration: {}", msg),
        }
    }
}

impl StdError for AuditError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AuditError::Configuration(e) => Some(e),
            AuditError::Verification(e) => Some(e),
            AuditError::Io(e) => Some(e),
        }
    }
}

impl StdError for ConfigurationError {}

impl From<ConfigurationError> for AuditError {
    fn from(e: ConfigurationError) -> Self {
        AuditError::Configuration(e)
    }
}

impl From<VerificationError> for AuditError {
    fn from(e: VerificationError) -> Self {
        AuditError::Verification(e)
    }
}

impl From<CryptoError> for AuditError {
    fn from(e: CryptoError) -> Self {
        AuditError::Verification(e.into())
    }
}

impl From<std::io::Error> for AuditError {
    fn from(e: std::io::Error) -> Self {
        AuditError::Io(e)
    }
}

// Convenience type alias for Results
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let audit_error = AuditError::Configuration(config_error);

        assert!(audit_error.to_string().contains("Configuration error"));
        assert!(audit_error.to_string().contains("test"));
    }

    #[test]
    fn test_invalid_parameter_details() {
        let err = VerificationError::invalid("rows", 9, "must be one of 8, 10, 12, 14, 16");

        assert!(err.to_string().contains("rows"));
        assert!(err.to_string().contains("'9'"));
    }

    #[test]
    fn test_crypto_error_conversion() {
        let err: VerificationError = CryptoError("engine offline".to_string()).into();
        assert_eq!(err, VerificationError::CryptoEngineUnavailable("engine offline".to_string()));

        let root: AuditError = CryptoError("engine offline".to_string()).into();
        match root {
            AuditError::Verification(VerificationError::CryptoEngineUnavailable(_)) => {}
            other => panic!("Expected crypto failure, got {:?}", other),
        }
    }

    #[test]
    fn test_error_source() {
        let audit_error = AuditError::Verification(VerificationError::Busy);
        assert!(audit_error.source().is_some());
    }
}
