//! The Ledger Record Gateway
//!
//! The orchestrator of the system: every inbound `get`/`set` runs one
//! sequential pipeline - resolve the caller identity, acquire a scoped
//! session, submit or query against the contract, and release the session
//! on every exit path. The gateway contains no internal parallelism and no
//! client-side locking; ordering across concurrent operations is left
//! entirely to the ledger.
//!
//! Dispatch is schema-driven: the gateway looks up the domain's declarative
//! schema and runs the same generic algorithm for every record kind.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use core_kernel::{GatewayError, Identity, TransactionReceipt};

use crate::domain::RecordDomain;
use crate::ports::{ContractSession, IdentityStore, LedgerConnector};
use crate::record::{LedgerEntry, RecordState, VehicleRecord};

/// Immutable per-process gateway configuration
///
/// Loaded once at startup and passed at construction time; the gateway never
/// reads configuration ad hoc per call.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use domain_records::GatewayConfig;
///
/// let config = GatewayConfig::new("appUser", "mychannel", "fabcar")
///     .connect_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Wallet alias the gateway authenticates as
    pub identity_alias: String,
    /// Ledger channel the contract is deployed to
    pub channel: String,
    /// Name of the deployed contract
    pub contract: String,
    /// Bound on identity resolution and session acquisition
    pub connect_timeout: Duration,
    /// Bound on each submit or query round trip
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(
        identity_alias: impl Into<String>,
        channel: impl Into<String>,
        contract: impl Into<String>,
    ) -> Self {
        Self {
            identity_alias: identity_alias.into(),
            channel: channel.into(),
            contract: contract.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the bound on identity resolution and session acquisition
    /// (default: 10s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the bound on each submit or query round trip (default: 30s)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new("appUser", "mychannel", "fabcar")
    }
}

/// The record gateway
///
/// Exposes `get` and `set` over the three record domains, driving the
/// identity store and ledger connector through the per-operation pipeline.
pub struct RecordGateway {
    identities: Arc<dyn IdentityStore>,
    connector: Arc<dyn LedgerConnector>,
    config: GatewayConfig,
}

impl RecordGateway {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        connector: Arc<dyn LedgerConnector>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            identities,
            connector,
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Reads the current state or full history of a record.
    ///
    /// Selects the schema's current-function or history-function and runs
    /// the query pipeline. A blank identifier is rejected before any network
    /// call.
    ///
    /// # Errors
    ///
    /// `NotFound` when the identifier has no committed entry (current query
    /// only - an empty history is a valid empty sequence); otherwise the
    /// taxonomy of the failing pipeline stage.
    pub async fn get(
        &self,
        domain: RecordDomain,
        identifier: &str,
        history: bool,
    ) -> Result<RecordState, GatewayError> {
        if identifier.trim().is_empty() {
            return Err(GatewayError::validation("identifier must not be blank"));
        }

        let schema = domain.schema();
        let identity = self.resolve_identity().await?;
        let session = self.open_session(&identity).await?;

        // Capture the outcome so release runs on every path.
        let result = if history {
            self.query_history(session.as_ref(), domain, schema.history_function, identifier)
                .await
                .map(RecordState::History)
        } else {
            self.query_current(session.as_ref(), domain, schema.current_function, identifier)
                .await
                .map(RecordState::Current)
        };
        session.release().await;

        match &result {
            Ok(_) => debug!(domain = %domain, identifier, history, "record query complete"),
            Err(e) => warn!(domain = %domain, identifier, history, error = %e, "record query failed"),
        }
        result
    }

    /// Appends a new record entry.
    ///
    /// Validates that every field the schema requires is present before any
    /// network call, then serializes the fields into the contract's fixed
    /// argument order and submits with the schema's set-function. Unknown
    /// extra fields are ignored.
    ///
    /// # Errors
    ///
    /// `Validation` enumerating the missing field names when the input is
    /// incomplete; otherwise the taxonomy of the failing pipeline stage.
    pub async fn set(
        &self,
        domain: RecordDomain,
        fields: &BTreeMap<String, String>,
    ) -> Result<TransactionReceipt, GatewayError> {
        let schema = domain.schema();
        let missing = schema.missing_fields(fields);
        if !missing.is_empty() {
            return Err(GatewayError::missing_fields(domain.as_str(), missing));
        }
        let args = schema.ordered_args(fields);

        let identity = self.resolve_identity().await?;
        let session = self.open_session(&identity).await?;

        let result = self
            .submit(session.as_ref(), schema.set_function, &args)
            .await;
        session.release().await;

        match &result {
            Ok(receipt) => info!(
                domain = %domain,
                identifier = %args[0],
                transaction_id = %receipt.transaction_id,
                "record committed"
            ),
            Err(e) => warn!(domain = %domain, identifier = %args[0], error = %e, "record submit failed"),
        }
        result
    }

    /// Submits a transaction on an open session, bounded by the request
    /// timeout. Blocks until the network reports commitment or failure.
    pub async fn submit(
        &self,
        session: &dyn ContractSession,
        function: &str,
        args: &[String],
    ) -> Result<TransactionReceipt, GatewayError> {
        let wait = self.config.request_timeout;
        timeout(wait, session.submit_transaction(function, args))
            .await
            .map_err(|_| GatewayError::transaction_timeout(function, wait.as_millis() as u64))?
    }

    /// Queries the latest committed record for an identifier.
    pub async fn query_current(
        &self,
        session: &dyn ContractSession,
        domain: RecordDomain,
        function: &str,
        identifier: &str,
    ) -> Result<VehicleRecord, GatewayError> {
        let payload = self.evaluate(session, function, identifier).await?;
        VehicleRecord::from_payload(domain, &payload)
    }

    /// Queries the full commitment history for an identifier, oldest first.
    /// An identifier with no history yields an empty vector, not an error.
    pub async fn query_history(
        &self,
        session: &dyn ContractSession,
        domain: RecordDomain,
        function: &str,
        identifier: &str,
    ) -> Result<Vec<LedgerEntry>, GatewayError> {
        let payload = self.evaluate(session, function, identifier).await?;
        LedgerEntry::parse_history(domain, &payload)
    }

    /// Verifies the gateway can resolve its configured identity. Used by
    /// readiness probes; never opens a session.
    pub async fn check_ready(&self) -> Result<(), GatewayError> {
        self.resolve_identity().await.map(|_| ())
    }

    async fn resolve_identity(&self) -> Result<Identity, GatewayError> {
        let wait = self.config.connect_timeout;
        timeout(wait, self.identities.resolve(&self.config.identity_alias))
            .await
            .map_err(|_| GatewayError::connection_timeout("identity resolution", wait.as_millis() as u64))?
    }

    async fn open_session(
        &self,
        identity: &Identity,
    ) -> Result<Box<dyn ContractSession>, GatewayError> {
        let wait = self.config.connect_timeout;
        timeout(
            wait,
            self.connector
                .acquire(identity, &self.config.channel, &self.config.contract),
        )
        .await
        .map_err(|_| GatewayError::connection_timeout("session acquisition", wait.as_millis() as u64))?
    }

    async fn evaluate(
        &self,
        session: &dyn ContractSession,
        function: &str,
        identifier: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        let wait = self.config.request_timeout;
        let args = [identifier.to_string()];
        timeout(wait, session.evaluate_transaction(function, &args))
            .await
            .map_err(|_| GatewayError::transaction_timeout(function, wait.as_millis() as u64))?
    }
}
