//! Request/response shapes
//!
//! The record API is stringly typed end to end: a set request is a flat JSON
//! object of field values, a record response is the same shape back, and
//! history responses are arrays of ledger entries. The gateway's own types
//! serialize to those shapes directly, so the only DTO here is the inbound
//! field map.

use std::collections::BTreeMap;

/// The inbound body of a set request: canonical field name to value
pub type FieldMap = BTreeMap<String, String>;
