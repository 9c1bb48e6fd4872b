//! Ledger infrastructure error types

use thiserror::Error;

use core_kernel::GatewayError;

/// Errors raised while reading provisioned artifacts or resolving the
/// network topology
#[derive(Debug, Error)]
pub enum LedgerInfraError {
    /// Failed to read a provisioned file
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A provisioned document exists but does not parse
    #[error("malformed document {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The connection profile names no usable gateway peer
    #[error("connection profile names no usable gateway peer: {0}")]
    NoGatewayPeer(String),

    /// A peer URL is not in a recognized scheme
    #[error("malformed peer url '{0}'")]
    MalformedPeerUrl(String),

    /// TLS material from the profile was rejected
    #[error("TLS material rejected: {0}")]
    Tls(String),
}

/// Maps infrastructure faults onto the gateway taxonomy: corrupt artifacts
/// are configuration errors; topology and TLS faults surface as connection
/// errors on acquire.
impl From<LedgerInfraError> for GatewayError {
    fn from(error: LedgerInfraError) -> Self {
        match &error {
            LedgerInfraError::Io { .. } | LedgerInfraError::Malformed { .. } => {
                GatewayError::configuration(error.to_string())
            }
            LedgerInfraError::NoGatewayPeer(_)
            | LedgerInfraError::MalformedPeerUrl(_)
            | LedgerInfraError::Tls(_) => GatewayError::connection(error.to_string()),
        }
    }
}
