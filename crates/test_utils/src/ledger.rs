//! In-Memory Ledger Double
//!
//! An instrumented stand-in for the ledger network that mirrors the deployed
//! vehicle lifecycle contract: per-domain key prefixes, a world state
//! holding the latest value per key, and an append-only history of every
//! commitment with minted transaction ids. Payload shapes match the
//! canonical contract encoding, so gateway projection code runs unchanged
//! against it.
//!
//! Instrumentation counts acquires, releases, and network calls so tests
//! can assert the session discipline; fault and delay knobs let tests drive
//! the failure paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{GatewayError, Identity, TransactionReceipt};
use domain_records::{ContractSession, DomainSchema, IdentityStore, LedgerConnector, RecordDomain};

/// In-memory identity store
///
/// Resolves identities from a map instead of a wallet directory. Missing
/// aliases fail exactly like the file-backed store.
#[derive(Clone, Default)]
pub struct FakeIdentityStore {
    identities: Arc<Mutex<HashMap<String, Identity>>>,
}

impl FakeIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one identity
    pub fn with_identity(identity: Identity) -> Self {
        let store = Self::new();
        store.enroll(identity);
        store
    }

    pub fn enroll(&self, identity: Identity) {
        self.identities
            .lock()
            .unwrap()
            .insert(identity.alias.clone(), identity);
    }
}

#[async_trait]
impl IdentityStore for FakeIdentityStore {
    async fn resolve(&self, alias: &str) -> Result<Identity, GatewayError> {
        self.identities
            .lock()
            .unwrap()
            .get(alias)
            .cloned()
            .ok_or_else(|| GatewayError::identity_not_found(alias))
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    /// World state: key -> latest committed fields
    state: Mutex<HashMap<String, BTreeMap<String, String>>>,
    /// Append-only history: key -> envelope values, oldest first
    history: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    committed_blocks: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    network_calls: AtomicU64,
    fail_acquire: Mutex<Option<String>>,
    acquire_delay: Mutex<Option<Duration>>,
    fail_next_submit: Mutex<Option<String>>,
    fail_next_evaluate: Mutex<Option<String>>,
    response_delay: Mutex<Option<Duration>>,
}

/// The instrumented in-memory ledger
///
/// Cheap to clone; clones share state, which lets a test keep a handle for
/// assertions while the gateway owns another.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -- instrumentation -----------------------------------------------------

    /// Number of sessions acquired so far
    pub fn acquired(&self) -> u64 {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    /// Number of sessions released so far
    pub fn released(&self) -> u64 {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Sessions acquired but not yet released
    pub fn open_sessions(&self) -> u64 {
        self.acquired() - self.released()
    }

    /// Submit and evaluate calls that reached the ledger
    pub fn network_calls(&self) -> u64 {
        self.inner.network_calls.load(Ordering::SeqCst)
    }

    // -- fault injection -----------------------------------------------------

    /// Makes every subsequent acquire fail with a connection error
    pub fn fail_acquire(&self, message: impl Into<String>) {
        *self.inner.fail_acquire.lock().unwrap() = Some(message.into());
    }

    /// Makes the next submit fail with a transaction error
    pub fn fail_next_submit(&self, message: impl Into<String>) {
        *self.inner.fail_next_submit.lock().unwrap() = Some(message.into());
    }

    /// Makes the next evaluate fail with a connection error
    pub fn fail_next_evaluate(&self, message: impl Into<String>) {
        *self.inner.fail_next_evaluate.lock().unwrap() = Some(message.into());
    }

    /// Delays every submit and evaluate response, for timeout tests
    pub fn delay_responses(&self, delay: Duration) {
        *self.inner.response_delay.lock().unwrap() = Some(delay);
    }

    /// Stalls every acquire, for connect-timeout tests
    pub fn delay_acquire(&self, delay: Duration) {
        *self.inner.acquire_delay.lock().unwrap() = Some(delay);
    }

    pub fn clear_faults(&self) {
        *self.inner.fail_acquire.lock().unwrap() = None;
        *self.inner.acquire_delay.lock().unwrap() = None;
        *self.inner.fail_next_submit.lock().unwrap() = None;
        *self.inner.fail_next_evaluate.lock().unwrap() = None;
        *self.inner.response_delay.lock().unwrap() = None;
    }

    // -- direct state access -------------------------------------------------

    /// Commits a record without going through a session, for seeding test
    /// state. Fields must satisfy the domain schema.
    pub fn seed(&self, domain: RecordDomain, fields: &BTreeMap<String, String>) {
        let schema = domain.schema();
        let args = schema.ordered_args(fields);
        self.inner.commit(schema, &args);
    }
}

impl LedgerInner {
    fn key(schema: &DomainSchema, identifier: &str) -> String {
        format!("{}_{}", schema.domain.as_str(), identifier)
    }

    fn commit(&self, schema: &DomainSchema, args: &[String]) -> TransactionReceipt {
        let fields: BTreeMap<String, String> = schema
            .required_fields()
            .zip(args.iter())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        let key = Self::key(schema, &args[0]);

        let tx_id = Uuid::new_v4().to_string();
        let block = self.committed_blocks.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = serde_json::json!({
            "txId": tx_id,
            "timestamp": Utc::now().to_rfc3339(),
            "isDelete": false,
            "value": fields,
        });

        self.state.lock().unwrap().insert(key.clone(), fields);
        self.history
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push(envelope);

        TransactionReceipt::new(tx_id).with_block_number(block)
    }

    fn schema_by_set_function(function: &str) -> Option<&'static DomainSchema> {
        RecordDomain::ALL
            .iter()
            .map(|d| d.schema())
            .find(|s| s.set_function == function)
    }

    fn schema_by_query_function(function: &str) -> Option<(&'static DomainSchema, bool)> {
        RecordDomain::ALL.iter().map(|d| d.schema()).find_map(|s| {
            if s.current_function == function {
                Some((s, false))
            } else if s.history_function == function {
                Some((s, true))
            } else {
                None
            }
        })
    }
}

/// One fake session handed out per acquire
#[derive(Debug)]
pub struct FakeSession {
    inner: Arc<LedgerInner>,
    released: AtomicBool,
}

impl FakeSession {
    fn guard_released(&self) -> Result<(), GatewayError> {
        if self.released.load(Ordering::SeqCst) {
            Err(GatewayError::connection("session already released"))
        } else {
            Ok(())
        }
    }

    async fn before_call(&self) -> Result<(), GatewayError> {
        self.guard_released()?;
        self.inner.network_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.inner.response_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl ContractSession for FakeSession {
    async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionReceipt, GatewayError> {
        self.before_call().await?;

        if let Some(message) = self.inner.fail_next_submit.lock().unwrap().take() {
            return Err(GatewayError::transaction(message));
        }

        let schema = LedgerInner::schema_by_set_function(function)
            .ok_or_else(|| GatewayError::transaction(format!("unknown function '{}'", function)))?;
        if args.len() != 1 + schema.ordered_fields.len() {
            return Err(GatewayError::transaction(format!(
                "{} expects {} arguments, got {}",
                function,
                1 + schema.ordered_fields.len(),
                args.len()
            )));
        }

        Ok(self.inner.commit(schema, args))
    }

    async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError> {
        self.before_call().await?;

        if let Some(message) = self.inner.fail_next_evaluate.lock().unwrap().take() {
            return Err(GatewayError::connection(message));
        }

        let (schema, history) = LedgerInner::schema_by_query_function(function)
            .ok_or_else(|| GatewayError::transaction(format!("unknown function '{}'", function)))?;
        let identifier = args
            .first()
            .ok_or_else(|| GatewayError::transaction("missing identifier argument"))?;
        let key = LedgerInner::key(schema, identifier);

        if history {
            let entries = self
                .inner
                .history
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_default();
            Ok(serde_json::to_vec(&entries).expect("history serialization"))
        } else {
            match self.inner.state.lock().unwrap().get(&key) {
                Some(fields) => Ok(serde_json::to_vec(fields).expect("record serialization")),
                None => Err(GatewayError::not_found(format!(
                    "{} does not exist",
                    identifier
                ))),
            }
        }
    }

    async fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.inner.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl LedgerConnector for InMemoryLedger {
    async fn acquire(
        &self,
        _identity: &Identity,
        _channel: &str,
        _contract: &str,
    ) -> Result<Box<dyn ContractSession>, GatewayError> {
        if let Some(message) = self.inner.fail_acquire.lock().unwrap().clone() {
            return Err(GatewayError::connection(message));
        }
        let delay = *self.inner.acquire_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            inner: Arc::clone(&self.inner),
            released: AtomicBool::new(false),
        }))
    }
}
