//! Record domain tags
//!
//! The three record kinds the ledger tracks for a vehicle. The tag is the
//! only per-domain input the gateway ever takes; everything else comes from
//! the schema table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::GatewayError;

/// The record domains persisted on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordDomain {
    /// Vehicle registration data
    Registration,
    /// Vehicle service history
    Service,
    /// Vehicle insurance data
    Insurance,
}

impl RecordDomain {
    /// All domains, in schema-table order
    pub const ALL: [RecordDomain; 3] = [
        RecordDomain::Registration,
        RecordDomain::Service,
        RecordDomain::Insurance,
    ];

    /// The lowercase name used in routes and ledger key prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordDomain::Registration => "registration",
            RecordDomain::Service => "service",
            RecordDomain::Insurance => "insurance",
        }
    }
}

impl fmt::Display for RecordDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordDomain {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(RecordDomain::Registration),
            "service" => Ok(RecordDomain::Service),
            "insurance" => Ok(RecordDomain::Insurance),
            other => Err(GatewayError::not_found(format!(
                "unknown record domain '{}'",
                other
            ))),
        }
    }
}
