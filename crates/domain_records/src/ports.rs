//! Record Gateway Ports
//!
//! The seams between the gateway and its collaborators. Adapters implement
//! these traits to provide the real ledger network (infra_ledger) or an
//! in-memory double (test_utils):
//!
//! - `IdentityStore`: resolves a named credential from the provisioned
//!   keystore
//! - `LedgerConnector`: opens a scoped session to one channel + contract
//! - `ContractSession`: the string-argument submit/evaluate boundary of one
//!   open session
//!
//! A session is owned exclusively by the operation that acquired it. The
//! gateway releases it exactly once on every exit path; `release` itself is
//! idempotent and infallible so the failure paths stay simple.

use async_trait::async_trait;

use core_kernel::{GatewayError, Identity, TransactionReceipt};

/// Resolves named credentials from the identity keystore
///
/// Pure read, no side effects; safe under concurrent readers.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolves the credential enrolled under `alias`.
    ///
    /// # Errors
    ///
    /// `GatewayError::IdentityNotFound` when no credential is enrolled under
    /// the alias; `GatewayError::Configuration` when the keystore artifact
    /// exists but cannot be read.
    async fn resolve(&self, alias: &str) -> Result<Identity, GatewayError>;
}

/// Opens scoped sessions against the ledger network
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Opens a session bound to one channel and one contract, authenticated
    /// as `identity`. One session per logical operation; sessions are never
    /// pooled or reused.
    ///
    /// # Errors
    ///
    /// `GatewayError::Connection` on unreachable endpoints or malformed
    /// topology input.
    async fn acquire(
        &self,
        identity: &Identity,
        channel: &str,
        contract: &str,
    ) -> Result<Box<dyn ContractSession>, GatewayError>;
}

/// One open session: the string-argument transaction boundary
///
/// Both methods take the contract function name and its ordered string
/// arguments; the gateway owns the canonical encoding of every field.
#[async_trait]
pub trait ContractSession: Send + Sync + std::fmt::Debug {
    /// Submits a transaction and blocks until the network reports
    /// commitment.
    ///
    /// # Errors
    ///
    /// `GatewayError::Transaction` when the ledger rejects the transaction
    /// or commitment cannot be confirmed; `GatewayError::Connection` when
    /// the session is unusable (including after release).
    async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionReceipt, GatewayError>;

    /// Evaluates a read-only query and returns the raw contract payload.
    ///
    /// # Errors
    ///
    /// `GatewayError::NotFound` when the identifier has no committed entry;
    /// transport faults as for `submit_transaction`.
    async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError>;

    /// Releases the session. Idempotent and infallible; safe to call after
    /// a prior failure. Submitting or evaluating on a released session fails
    /// with `GatewayError::Connection`.
    async fn release(&self);
}
