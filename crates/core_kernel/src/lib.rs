//! Core Kernel - Foundational types for the vehicle ledger system
//!
//! This crate provides the fundamental building blocks used across all layers:
//! - The gateway error taxonomy shared by every operation boundary
//! - Resolved identity credentials
//! - Transaction receipts returned by the ledger network

pub mod error;
pub mod identity;
pub mod transaction;

pub use error::GatewayError;
pub use identity::Identity;
pub use transaction::TransactionReceipt;
