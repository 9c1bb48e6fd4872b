//! The uniform error taxonomy for ledger gateway operations
//!
//! Every operation boundary converts internal faults to this type before
//! returning to the caller; nothing below the gateway surfaces an unhandled
//! fault upward. Retry policy belongs to the caller - the predicates here
//! tell it which errors are worth retrying.

use thiserror::Error;

/// Errors surfaced by gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No enrolled credential exists for the requested alias. Terminal;
    /// retrying without re-provisioning the wallet cannot succeed.
    #[error("identity not found: no enrolled credential for alias '{0}'")]
    IdentityNotFound(String),

    /// The ledger network could not be reached or the topology input was
    /// malformed. The caller may retry.
    #[error("connection error: {message}")]
    Connection { message: String, timed_out: bool },

    /// Input rejected before any network call was made.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        missing_fields: Vec<String>,
    },

    /// The ledger rejected the transaction or commitment could not be
    /// confirmed. Carries the network-reported cause.
    #[error("transaction error: {message}")]
    Transaction { message: String, timed_out: bool },

    /// No committed entry exists for the identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// An externally-provisioned artifact (wallet file, connection profile)
    /// is unreadable or corrupt.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    pub fn identity_not_found(alias: impl Into<String>) -> Self {
        GatewayError::IdentityNotFound(alias.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        GatewayError::Connection {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates the timeout-flavored connection error used when identity
    /// resolution or session acquisition exceeds its bounded wait.
    pub fn connection_timeout(operation: &str, duration_ms: u64) -> Self {
        GatewayError::Connection {
            message: format!("{} timed out after {}ms", operation, duration_ms),
            timed_out: true,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation {
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }

    /// Creates a validation error enumerating missing field names, in the
    /// order the domain schema declares them.
    pub fn missing_fields(domain: &str, fields: Vec<String>) -> Self {
        GatewayError::Validation {
            message: format!(
                "{} record is missing required fields: {}",
                domain,
                fields.join(", ")
            ),
            missing_fields: fields,
        }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        GatewayError::Transaction {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates the timeout-flavored transaction error used when a submit or
    /// query exceeds its bounded wait.
    pub fn transaction_timeout(operation: &str, duration_ms: u64) -> Self {
        GatewayError::Transaction {
            message: format!("{} timed out after {}ms", operation, duration_ms),
            timed_out: true,
        }
    }

    pub fn not_found(identifier: impl Into<String>) -> Self {
        GatewayError::NotFound(identifier.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        GatewayError::Configuration(message.into())
    }

    /// Returns true if this error indicates a transient fault that may
    /// succeed if the caller retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Connection { .. })
    }

    /// Returns true if this error indicates the identifier was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    /// Returns true if this error was caused by a bounded wait expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GatewayError::Connection { timed_out: true, .. }
                | GatewayError::Transaction { timed_out: true, .. }
        )
    }
}
