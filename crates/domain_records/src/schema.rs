//! Declarative domain schemas
//!
//! Each record domain is described by one static entry: the three contract
//! function names, the identifier field, and the ordered list of the
//! remaining fields. The gateway looks the entry up and runs one generic
//! algorithm - it never branches per domain. Adding a record domain means
//! adding a `RecordDomain` variant and one entry here.

use std::collections::BTreeMap;

use crate::domain::RecordDomain;

/// The declarative adapter for one record domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSchema {
    pub domain: RecordDomain,
    /// Contract function that appends a new entry
    pub set_function: &'static str,
    /// Contract function that returns the latest committed entry
    pub current_function: &'static str,
    /// Contract function that returns the full commitment history
    pub history_function: &'static str,
    /// The primary identifier field, unique per domain on the ledger
    pub identifier_field: &'static str,
    /// Remaining fields, in contract argument order
    pub ordered_fields: &'static [&'static str],
}

/// One entry per domain; function names and field order are fixed by the
/// deployed vehicle lifecycle contract.
const SCHEMAS: [DomainSchema; 3] = [
    DomainSchema {
        domain: RecordDomain::Registration,
        set_function: "SetRegData",
        current_function: "GetRegData",
        history_function: "GetRegDataHistory",
        identifier_field: "regNumber",
        ordered_fields: &["chassisNumber", "engineNumber", "monthYearOfMfg"],
    },
    DomainSchema {
        domain: RecordDomain::Service,
        set_function: "SetServiceData",
        current_function: "GetServiceData",
        history_function: "GetServiceDataHistory",
        identifier_field: "regNumber",
        ordered_fields: &[
            "chassisNumber",
            "engineNumber",
            "monthYearOfMfg",
            "serviceDetails",
        ],
    },
    DomainSchema {
        domain: RecordDomain::Insurance,
        set_function: "SetInsuranceData",
        current_function: "GetInsuranceData",
        history_function: "GetInsuranceDataHistory",
        identifier_field: "regNumber",
        ordered_fields: &[
            "UINNumber",
            "PolicyNumber",
            "InsuredNameAndAddress",
            "ContactNumber",
            "EmailId",
            "PeriodOfCover",
            "PremiumDetails",
        ],
    },
];

impl RecordDomain {
    /// Returns this domain's schema entry
    pub fn schema(&self) -> &'static DomainSchema {
        match self {
            RecordDomain::Registration => &SCHEMAS[0],
            RecordDomain::Service => &SCHEMAS[1],
            RecordDomain::Insurance => &SCHEMAS[2],
        }
    }
}

impl DomainSchema {
    /// Every field the schema requires: the identifier first, then the
    /// ordered fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.identifier_field).chain(self.ordered_fields.iter().copied())
    }

    /// Returns the required fields absent from `fields`, in schema order.
    /// A field that is present but blank counts as missing.
    pub fn missing_fields(&self, fields: &BTreeMap<String, String>) -> Vec<String> {
        self.required_fields()
            .filter(|name| fields.get(*name).map_or(true, |v| v.trim().is_empty()))
            .map(String::from)
            .collect()
    }

    /// Serializes `fields` into the contract's fixed argument order, the
    /// identifier first. Unknown extra fields are ignored. Callers must have
    /// validated presence via [`missing_fields`](Self::missing_fields).
    pub fn ordered_args(&self, fields: &BTreeMap<String, String>) -> Vec<String> {
        self.required_fields()
            .map(|name| fields.get(name).cloned().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_schema_lookup_matches_domain() {
        for domain in RecordDomain::ALL {
            assert_eq!(domain.schema().domain, domain);
        }
    }

    #[test]
    fn test_missing_fields_in_schema_order() {
        let schema = RecordDomain::Service.schema();
        let fields = field_map(&[("regNumber", "TS09AE0200")]);
        assert_eq!(
            schema.missing_fields(&fields),
            vec![
                "chassisNumber",
                "engineNumber",
                "monthYearOfMfg",
                "serviceDetails"
            ]
        );
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let schema = RecordDomain::Registration.schema();
        let fields = field_map(&[
            ("regNumber", "TS09AE0200"),
            ("chassisNumber", "   "),
            ("engineNumber", "G12BN164280"),
            ("monthYearOfMfg", "05/2019"),
        ]);
        assert_eq!(schema.missing_fields(&fields), vec!["chassisNumber"]);
    }

    #[test]
    fn test_ordered_args_identifier_first() {
        let schema = RecordDomain::Registration.schema();
        let fields = field_map(&[
            ("chassisNumber", "MA3EYD32S00B12345"),
            ("engineNumber", "G12BN164280"),
            ("monthYearOfMfg", "05/2019"),
            ("regNumber", "TS09AE0200"),
            ("color", "ignored extra field"),
        ]);
        assert_eq!(
            schema.ordered_args(&fields),
            vec![
                "TS09AE0200",
                "MA3EYD32S00B12345",
                "G12BN164280",
                "05/2019"
            ]
        );
    }
}
