//! Record Gateway Tests
//!
//! Exercises the full operation pipeline against the instrumented in-memory
//! ledger: round trips, history ordering, absence semantics, session
//! discipline, pre-network validation, and timeout behavior.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use core_kernel::GatewayError;
use domain_records::{GatewayConfig, RecordDomain, RecordGateway, RecordState};
use test_utils::{FakeIdentityStore, FieldMapBuilder, IdentityFixtures, InMemoryLedger, RecordFixtures};

fn gateway_over(ledger: &InMemoryLedger) -> RecordGateway {
    RecordGateway::new(
        Arc::new(FakeIdentityStore::with_identity(IdentityFixtures::app_user())),
        Arc::new(ledger.clone()),
        GatewayConfig::default(),
    )
}

fn fixture_fields(domain: RecordDomain) -> BTreeMap<String, String> {
    match domain {
        RecordDomain::Registration => RecordFixtures::registration_fields(),
        RecordDomain::Service => RecordFixtures::service_fields(),
        RecordDomain::Insurance => RecordFixtures::insurance_fields(),
    }
}

mod round_trip {
    use super::*;

    /// A set followed by a current-state get returns exactly the submitted
    /// fields, for every domain.
    #[tokio::test]
    async fn test_set_then_get_returns_submitted_fields() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        for domain in RecordDomain::ALL {
            let fields = fixture_fields(domain);
            let receipt = gateway.set(domain, &fields).await.unwrap();
            assert!(!receipt.transaction_id.is_empty());

            let state = gateway
                .get(domain, RecordFixtures::reg_number(), false)
                .await
                .unwrap();
            match state {
                RecordState::Current(record) => assert_eq!(record.fields(), &fields),
                RecordState::History(_) => panic!("expected current state"),
            }
        }
    }

    /// Unknown extra fields are ignored on set; the committed record is
    /// exactly the schema.
    #[tokio::test]
    async fn test_extra_fields_are_ignored() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let fields = FieldMapBuilder::from_fields(RecordFixtures::registration_fields())
            .field("color", "midnight blue")
            .build();
        gateway.set(RecordDomain::Registration, &fields).await.unwrap();

        let state = gateway
            .get(RecordDomain::Registration, RecordFixtures::reg_number(), false)
            .await
            .unwrap();
        match state {
            RecordState::Current(record) => {
                assert_eq!(record.fields(), &RecordFixtures::registration_fields());
                assert_eq!(record.get("color"), None);
            }
            RecordState::History(_) => panic!("expected current state"),
        }
    }

    /// The end-to-end insurance scenario: the full fixture record survives
    /// the round trip unchanged.
    #[tokio::test]
    async fn test_insurance_record_round_trips_unchanged() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        let fields = RecordFixtures::insurance_fields();

        gateway.set(RecordDomain::Insurance, &fields).await.unwrap();
        let state = gateway
            .get(RecordDomain::Insurance, "TS09AE0200", false)
            .await
            .unwrap();

        match state {
            RecordState::Current(record) => {
                assert_eq!(record.identifier(), "TS09AE0200");
                assert_eq!(record.get("UINNumber"), Some("UIN240720211076"));
                assert_eq!(record.get("PolicyNumber"), Some("BAJAL11012023421"));
                assert_eq!(record.get("InsuredNameAndAddress"), Some("Somajiguda, Hyderabad"));
                assert_eq!(record.get("ContactNumber"), Some("9979788665"));
                assert_eq!(record.get("EmailId"), Some("vehiclelifecycle2@gmail.com"));
                assert_eq!(record.get("PeriodOfCover"), Some("15/05/2021 to 14/03/2022"));
                assert_eq!(record.get("PremiumDetails"), Some("Rs 17,000"));
            }
            RecordState::History(_) => panic!("expected current state"),
        }
    }
}

mod history_ordering {
    use super::*;

    /// N sets on one identifier yield exactly N history entries, oldest
    /// first, each matching the corresponding submitted fields.
    #[tokio::test]
    async fn test_history_is_append_only_and_ordered() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let details = [
            "20,000 km scheduled maintenance",
            "40,000 km scheduled maintenance, oil and filter change",
            "brake pad replacement",
        ];
        for detail in details {
            let fields = FieldMapBuilder::from_fields(RecordFixtures::service_fields())
                .field("serviceDetails", detail)
                .build();
            gateway.set(RecordDomain::Service, &fields).await.unwrap();
        }

        let state = gateway
            .get(RecordDomain::Service, RecordFixtures::reg_number(), true)
            .await
            .unwrap();
        let entries = match state {
            RecordState::History(entries) => entries,
            RecordState::Current(_) => panic!("expected history"),
        };

        assert_eq!(entries.len(), details.len());
        for (entry, detail) in entries.iter().zip(details) {
            let record = entry.value.as_ref().expect("committed entry has a value");
            assert_eq!(record.get("serviceDetails"), Some(detail));
            assert!(!entry.is_delete);
        }
    }

    /// Current state after multiple sets is the most recent commitment.
    #[tokio::test]
    async fn test_current_is_latest_commitment() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        gateway
            .set(RecordDomain::Insurance, &RecordFixtures::insurance_fields())
            .await
            .unwrap();
        let renewed = FieldMapBuilder::from_fields(RecordFixtures::insurance_fields())
            .field("PeriodOfCover", "15/05/2022 to 14/03/2023")
            .field("PremiumDetails", "Rs 18,500")
            .build();
        gateway.set(RecordDomain::Insurance, &renewed).await.unwrap();

        let state = gateway
            .get(RecordDomain::Insurance, RecordFixtures::reg_number(), false)
            .await
            .unwrap();
        match state {
            RecordState::Current(record) => {
                assert_eq!(record.get("PremiumDetails"), Some("Rs 18,500"));
            }
            RecordState::History(_) => panic!("expected current state"),
        }
    }
}

mod absence {
    use super::*;

    /// A never-set identifier is NotFound for current state.
    #[tokio::test]
    async fn test_current_of_unknown_identifier_is_not_found() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let err = gateway
            .get(RecordDomain::Registration, "KA01AB9999", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    /// A never-set identifier has an empty history, not an error.
    #[tokio::test]
    async fn test_history_of_unknown_identifier_is_empty() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let state = gateway
            .get(RecordDomain::Registration, "KA01AB9999", true)
            .await
            .unwrap();
        match state {
            RecordState::History(entries) => assert!(entries.is_empty()),
            RecordState::Current(_) => panic!("expected history"),
        }
    }

    /// Domains are isolated: a registration record does not make the same
    /// identifier visible to insurance queries.
    #[tokio::test]
    async fn test_identifiers_are_scoped_per_domain() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        gateway
            .set(RecordDomain::Registration, &RecordFixtures::registration_fields())
            .await
            .unwrap();
        let err = gateway
            .get(RecordDomain::Insurance, RecordFixtures::reg_number(), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

mod validation {
    use super::*;

    /// An incomplete set fails with a validation error enumerating every
    /// missing field, and nothing reaches the network.
    #[tokio::test]
    async fn test_missing_fields_fail_before_any_network_call() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let mut fields = BTreeMap::new();
        fields.insert("regNumber".to_string(), "TS09AE0200".to_string());

        let err = gateway.set(RecordDomain::Service, &fields).await.unwrap_err();
        match err {
            GatewayError::Validation { missing_fields, .. } => {
                assert_eq!(
                    missing_fields,
                    vec![
                        "chassisNumber",
                        "engineNumber",
                        "monthYearOfMfg",
                        "serviceDetails"
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert_eq!(ledger.network_calls(), 0);
        assert_eq!(ledger.acquired(), 0);
    }

    /// A blank identifier on get is rejected pre-network.
    #[tokio::test]
    async fn test_blank_identifier_rejected_before_network() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        let err = gateway
            .get(RecordDomain::Insurance, "   ", false)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
        assert_eq!(ledger.acquired(), 0);
    }
}

mod resource_safety {
    use super::*;

    /// Successful operations pair every acquire with exactly one release.
    #[tokio::test]
    async fn test_sessions_released_on_success() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        gateway
            .set(RecordDomain::Registration, &RecordFixtures::registration_fields())
            .await
            .unwrap();
        gateway
            .get(RecordDomain::Registration, RecordFixtures::reg_number(), false)
            .await
            .unwrap();
        gateway
            .get(RecordDomain::Registration, RecordFixtures::reg_number(), true)
            .await
            .unwrap();

        assert_eq!(ledger.acquired(), 3);
        assert_eq!(ledger.released(), 3);
        assert_eq!(ledger.open_sessions(), 0);
    }

    /// A failing acquire creates no session and leaks nothing.
    #[tokio::test]
    async fn test_failed_acquire_leaks_nothing() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.fail_acquire("peer unreachable");

        let err = gateway
            .set(RecordDomain::Service, &RecordFixtures::service_fields())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(ledger.acquired(), 0);
        assert_eq!(ledger.open_sessions(), 0);
    }

    /// A submit fault mid-operation still releases the session before the
    /// error surfaces.
    #[tokio::test]
    async fn test_submit_fault_still_releases_session() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.fail_next_submit("endorsement policy not satisfied");

        let err = gateway
            .set(RecordDomain::Insurance, &RecordFixtures::insurance_fields())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transaction { .. }));
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
    }

    /// A query fault mid-operation still releases the session.
    #[tokio::test]
    async fn test_query_fault_still_releases_session() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.fail_next_evaluate("peer connection reset");

        let err = gateway
            .get(RecordDomain::Service, RecordFixtures::reg_number(), true)
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
    }

    /// An unresolvable identity fails before any session exists.
    #[tokio::test]
    async fn test_identity_miss_precedes_connection() {
        let ledger = InMemoryLedger::new();
        let gateway = RecordGateway::new(
            Arc::new(FakeIdentityStore::new()),
            Arc::new(ledger.clone()),
            GatewayConfig::default(),
        );

        let err = gateway
            .set(RecordDomain::Registration, &RecordFixtures::registration_fields())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IdentityNotFound(_)));
        assert_eq!(ledger.acquired(), 0);
    }

    /// The readiness check resolves the configured identity and nothing
    /// else.
    #[tokio::test]
    async fn test_check_ready_never_opens_a_session() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);

        gateway.check_ready().await.unwrap();
        assert_eq!(ledger.acquired(), 0);

        let unready = RecordGateway::new(
            Arc::new(FakeIdentityStore::new()),
            Arc::new(ledger.clone()),
            GatewayConfig::default(),
        );
        assert!(unready.check_ready().await.is_err());
    }
}

mod timeouts {
    use super::*;

    /// A stalled submit fails with the timeout-flavored transaction error
    /// and still drives the pipeline through release.
    #[tokio::test(start_paused = true)]
    async fn test_stalled_submit_times_out_and_releases() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.delay_responses(Duration::from_secs(300));

        let err = gateway
            .set(RecordDomain::Insurance, &RecordFixtures::insurance_fields())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, GatewayError::Transaction { .. }));
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
    }

    /// A stalled query times out and releases.
    #[tokio::test(start_paused = true)]
    async fn test_stalled_query_times_out_and_releases() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.delay_responses(Duration::from_secs(300));

        let err = gateway
            .get(RecordDomain::Service, RecordFixtures::reg_number(), true)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(ledger.open_sessions(), 0);
    }

    /// A stalled acquire fails with the timeout-flavored connection error;
    /// no session exists to release.
    #[tokio::test(start_paused = true)]
    async fn test_stalled_acquire_times_out() {
        let ledger = InMemoryLedger::new();
        let gateway = gateway_over(&ledger);
        ledger.delay_acquire(Duration::from_secs(300));

        let err = gateway
            .get(RecordDomain::Registration, RecordFixtures::reg_number(), false)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, GatewayError::Connection { .. }));
        assert_eq!(ledger.open_sessions(), 0);
    }
}

mod argument_encoding {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For any schema and any generated field values, the encoded
        /// argument list places the identifier first and preserves the
        /// schema's field order.
        #[test]
        fn prop_ordered_args_follow_schema(
            domain_idx in 0usize..3,
            values in proptest::collection::vec("[a-zA-Z0-9,/ -]{1,24}", 8),
        ) {
            let domain = RecordDomain::ALL[domain_idx];
            let schema = domain.schema();

            let mut fields = BTreeMap::new();
            for (name, value) in schema.required_fields().zip(values.iter()) {
                fields.insert(name.to_string(), value.clone());
            }

            let args = schema.ordered_args(&fields);
            prop_assert_eq!(args.len(), 1 + schema.ordered_fields.len());
            prop_assert_eq!(&args[0], &fields[schema.identifier_field]);
            for (i, name) in schema.ordered_fields.iter().enumerate() {
                prop_assert_eq!(&args[i + 1], &fields[*name]);
            }
        }
    }
}
