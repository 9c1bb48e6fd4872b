//! Ledger Infrastructure Layer
//!
//! Adapters over the externally-provisioned ledger artifacts and the peer
//! network:
//!
//! - `wallet`: the file-system identity keystore (`IdentityStore`)
//! - `profile`: the read-only network topology descriptor
//! - `connection`: the per-operation peer session connector
//!   (`LedgerConnector`)
//!
//! The wallet and the connection profile are produced by provisioning
//! tooling and only ever read here.

pub mod connection;
pub mod error;
pub mod profile;
pub mod wallet;

pub use connection::NetworkConnector;
pub use error::LedgerInfraError;
pub use profile::{ConnectionProfile, GatewayPeer};
pub use wallet::FileWallet;
