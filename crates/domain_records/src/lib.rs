//! Vehicle Record Domain
//!
//! This crate is the core of the system: the Ledger Record Gateway and the
//! declarative schemas it dispatches over.
//!
//! # Architecture
//!
//! - **Schemas**: one declarative entry per record domain (registration,
//!   service, insurance) naming the contract functions, the identifier
//!   field, and the ordered argument list
//! - **Records**: domain records and ledger history entries projected back
//!   from contract payloads
//! - **Ports**: the traits the gateway drives - identity resolution, session
//!   acquisition, and the string-argument submit/evaluate boundary
//! - **Gateway**: the orchestrator running the per-operation pipeline
//!   (resolve, acquire, submit or query, release on every path)
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_records::{RecordDomain, RecordGateway, GatewayConfig};
//!
//! let gateway = RecordGateway::new(identity_store, connector, GatewayConfig::default());
//! let state = gateway.get(RecordDomain::Insurance, "TS09AE0200", false).await?;
//! ```

pub mod domain;
pub mod gateway;
pub mod ports;
pub mod record;
pub mod schema;

pub use domain::RecordDomain;
pub use gateway::{GatewayConfig, RecordGateway};
pub use ports::{ContractSession, IdentityStore, LedgerConnector};
pub use record::{LedgerEntry, RecordState, VehicleRecord};
pub use schema::DomainSchema;
