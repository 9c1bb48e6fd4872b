//! Domain records and ledger projections
//!
//! A `VehicleRecord` is the schema-shaped view of one contract payload; a
//! `LedgerEntry` is the committed state of a record at one point in ledger
//! history. The gateway owns the canonical encoding on both boundaries:
//! contract payloads are JSON objects keyed by the schema's canonical field
//! names, and history is a JSON array of entry envelopes, oldest first.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use core_kernel::GatewayError;

use crate::domain::RecordDomain;

/// A record projected from a contract payload through its domain schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    domain: RecordDomain,
    fields: BTreeMap<String, String>,
}

impl VehicleRecord {
    /// Projects a contract payload into a record, keeping exactly the fields
    /// the domain schema declares.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Transaction` when the payload is not a JSON
    /// object of strings or a schema field is absent - the ledger returned
    /// something the contract should never commit.
    pub fn from_payload(domain: RecordDomain, payload: &[u8]) -> Result<Self, GatewayError> {
        let value: serde_json::Value = serde_json::from_slice(payload).map_err(|e| {
            GatewayError::transaction(format!("malformed {} payload: {}", domain, e))
        })?;
        Self::from_value(domain, &value)
    }

    /// Projects an already-parsed JSON value, as found inside history
    /// envelopes.
    pub fn from_value(domain: RecordDomain, value: &serde_json::Value) -> Result<Self, GatewayError> {
        let object = value.as_object().ok_or_else(|| {
            GatewayError::transaction(format!("malformed {} payload: expected an object", domain))
        })?;

        let schema = domain.schema();
        let mut fields = BTreeMap::new();
        for name in schema.required_fields() {
            let field = object.get(name).and_then(|v| v.as_str()).ok_or_else(|| {
                GatewayError::transaction(format!(
                    "malformed {} payload: missing field '{}'",
                    domain, name
                ))
            })?;
            fields.insert(name.to_string(), field.to_string());
        }

        Ok(Self { domain, fields })
    }

    /// Builds a record directly from a validated field map. Extra fields
    /// beyond the schema are dropped.
    pub fn from_fields(
        domain: RecordDomain,
        fields: &BTreeMap<String, String>,
    ) -> Result<Self, GatewayError> {
        let schema = domain.schema();
        let missing = schema.missing_fields(fields);
        if !missing.is_empty() {
            return Err(GatewayError::missing_fields(domain.as_str(), missing));
        }
        let fields = schema
            .required_fields()
            .map(|name| (name.to_string(), fields[name].clone()))
            .collect();
        Ok(Self { domain, fields })
    }

    pub fn domain(&self) -> RecordDomain {
        self.domain
    }

    /// The record's primary identifier (the vehicle registration number)
    pub fn identifier(&self) -> &str {
        &self.fields[self.domain.schema().identifier_field]
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

// Serializes as the flat field object - the domain tag is carried by the
// request context, not the payload.
impl Serialize for VehicleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One committed state of a record in ledger history
///
/// Immutable once committed; the history of an identifier is an append-only,
/// time-ordered sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Ledger-assigned transaction id of the commitment
    pub tx_id: String,
    /// Commitment time reported by the ledger
    pub timestamp: DateTime<Utc>,
    /// True when the entry records a key deletion
    pub is_delete: bool,
    /// The committed record; absent for deletions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<VehicleRecord>,
}

/// Wire shape of a history envelope as returned by the contract
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryEnvelope {
    tx_id: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    is_delete: bool,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl LedgerEntry {
    /// Parses a history payload into entries, oldest first, projecting each
    /// committed value through the domain schema. An empty array is a valid
    /// empty history.
    pub fn parse_history(
        domain: RecordDomain,
        payload: &[u8],
    ) -> Result<Vec<LedgerEntry>, GatewayError> {
        let envelopes: Vec<EntryEnvelope> = serde_json::from_slice(payload).map_err(|e| {
            GatewayError::transaction(format!("malformed {} history payload: {}", domain, e))
        })?;

        envelopes
            .into_iter()
            .map(|envelope| {
                let value = match (&envelope.value, envelope.is_delete) {
                    (Some(value), false) => Some(VehicleRecord::from_value(domain, value)?),
                    _ => None,
                };
                Ok(LedgerEntry {
                    tx_id: envelope.tx_id,
                    timestamp: envelope.timestamp,
                    is_delete: envelope.is_delete,
                    value,
                })
            })
            .collect()
    }
}

/// The outcome of a `get` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordState {
    /// The most recently committed record for the identifier
    Current(VehicleRecord),
    /// The full commitment history, oldest first
    History(Vec<LedgerEntry>),
}
