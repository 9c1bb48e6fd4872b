//! Test Data Builders
//!
//! Fluent construction of record field maps, for tests that need a fixture
//! with a twist (a missing field, an overridden value, an unknown extra).

use std::collections::BTreeMap;

/// Builder for record field maps
///
/// # Example
///
/// ```rust
/// use test_utils::{FieldMapBuilder, RecordFixtures};
///
/// let fields = FieldMapBuilder::from_fields(RecordFixtures::service_fields())
///     .without("serviceDetails")
///     .field("engineNumber", "G12BN999999")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldMapBuilder {
    fields: BTreeMap<String, String>,
}

impl FieldMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing field map, typically a fixture
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Sets a field, overwriting any existing value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Removes a field
    pub fn without(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self
    }

    pub fn build(self) -> BTreeMap<String, String> {
        self.fields
    }
}
