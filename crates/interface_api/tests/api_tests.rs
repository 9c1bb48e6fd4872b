//! HTTP API integration tests
//!
//! Full-stack tests over the router with the in-memory ledger double behind
//! the gateway: real routing, real JSON bodies, fake network.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use domain_records::{GatewayConfig, RecordGateway};
use interface_api::create_router;
use test_utils::{FakeIdentityStore, FieldMapBuilder, IdentityFixtures, InMemoryLedger, RecordFixtures};

fn test_server_with_ledger() -> (TestServer, InMemoryLedger) {
    let ledger = InMemoryLedger::new();
    let identities = FakeIdentityStore::with_identity(IdentityFixtures::app_user());
    let gateway = Arc::new(RecordGateway::new(
        Arc::new(identities),
        Arc::new(ledger.clone()),
        GatewayConfig::default(),
    ));
    let server = TestServer::new(create_router(gateway)).unwrap();
    (server, ledger)
}

fn test_server() -> TestServer {
    test_server_with_ledger().0
}

mod record_routes {
    use super::*;

    #[tokio::test]
    async fn test_set_record_returns_receipt() {
        let server = test_server();

        let response = server
            .post("/api/insurance")
            .json(&RecordFixtures::insurance_fields())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["transactionId"].is_string());
        assert!(body["blockNumber"].is_u64());
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let server = test_server();
        server
            .post("/api/insurance")
            .json(&RecordFixtures::insurance_fields())
            .await
            .assert_status_ok();

        let response = server
            .get(&format!("/api/insurance/{}", RecordFixtures::reg_number()))
            .await;
        response.assert_status_ok();

        let body: BTreeMap<String, String> = response.json();
        assert_eq!(body, RecordFixtures::insurance_fields());
    }

    #[tokio::test]
    async fn test_history_lists_every_commit_oldest_first() {
        let server = test_server();

        let first = FieldMapBuilder::from_fields(RecordFixtures::service_fields())
            .field("serviceDetails", "20,000 km scheduled maintenance")
            .build();
        server.post("/api/service").json(&first).await.assert_status_ok();
        server
            .post("/api/service")
            .json(&RecordFixtures::service_fields())
            .await
            .assert_status_ok();

        let response = server
            .get(&format!(
                "/api/service/{}/history",
                RecordFixtures::reg_number()
            ))
            .await;
        response.assert_status_ok();

        let entries: Vec<Value> = response.json();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0]["value"]["serviceDetails"],
            "20,000 km scheduled maintenance"
        );
        assert_eq!(
            entries[1]["value"]["serviceDetails"],
            RecordFixtures::service_fields()["serviceDetails"]
        );
        for entry in &entries {
            assert!(entry["txId"].is_string());
            assert!(entry["timestamp"].is_string());
            assert_eq!(entry["isDelete"], false);
        }
    }

    #[tokio::test]
    async fn test_domains_are_isolated() {
        let server = test_server();
        server
            .post("/api/registration")
            .json(&RecordFixtures::registration_fields())
            .await
            .assert_status_ok();

        // Same identifier, different domain: nothing committed there yet.
        let response = server
            .get(&format!("/api/insurance/{}", RecordFixtures::reg_number()))
            .await;
        response.assert_status_not_found();
    }
}

mod error_responses {
    use super::*;

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let server = test_server();

        let response = server.get("/api/registration/GHOST123").await;
        response.assert_status_not_found();

        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_domain_is_not_found() {
        let server = test_server();
        let response = server.get("/api/warranty/TS09AE0200").await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_missing_fields_are_enumerated() {
        let (server, ledger) = test_server_with_ledger();

        let incomplete = FieldMapBuilder::from_fields(RecordFixtures::insurance_fields())
            .without("PolicyNumber")
            .without("PremiumDetails")
            .build();
        let response = server.post("/api/insurance").json(&incomplete).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
        let details: Vec<String> = serde_json::from_value(body["details"].clone()).unwrap();
        assert_eq!(details, vec!["PolicyNumber", "PremiumDetails"]);

        // Rejected before any session or network traffic.
        assert_eq!(ledger.acquired(), 0);
        assert_eq!(ledger.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_service_unavailable() {
        let (server, ledger) = test_server_with_ledger();
        ledger.fail_acquire("peer unreachable");

        let response = server
            .post("/api/registration")
            .json(&RecordFixtures::registration_fields())
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["error"], "ledger_unreachable");
    }

    #[tokio::test]
    async fn test_ledger_rejection_is_bad_gateway() {
        let (server, ledger) = test_server_with_ledger();
        ledger.fail_next_submit("endorsement policy failure");

        let response = server
            .post("/api/service")
            .json(&RecordFixtures::service_fields())
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let body: Value = response.json();
        assert_eq!(body["error"], "transaction_failed");
    }
}

mod health_routes {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let server = test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_readiness_with_enrolled_identity() {
        let server = test_server();
        let response = server.get("/health/ready").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_readiness_without_identity_is_unavailable() {
        let ledger = InMemoryLedger::new();
        let gateway = Arc::new(RecordGateway::new(
            Arc::new(FakeIdentityStore::new()),
            Arc::new(ledger),
            GatewayConfig::default(),
        ));
        let server = TestServer::new(create_router(gateway)).unwrap();

        let response = server.get("/health/ready").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["status"], "not_ready");
    }
}
