//! Transaction receipts
//!
//! The acknowledgement the ledger network returns once a submitted
//! transaction has been ordered and committed.

use serde::{Deserialize, Serialize};

/// Acknowledgement of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Ledger-assigned transaction id
    pub transaction_id: String,
    /// Block the transaction was committed in, when the network reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl TransactionReceipt {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            block_number: None,
        }
    }

    pub fn with_block_number(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }
}
