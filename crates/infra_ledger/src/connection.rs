//! Peer Network Connector
//!
//! The `LedgerConnector` over an HTTP(S) peer gateway endpoint. One session
//! per logical operation: every acquire builds a fresh TLS-configured
//! client, probes the channel, and hands back a `PeerSession` bound to one
//! channel and one contract. Nothing is pooled or reused across operations -
//! the setup cost buys strict isolation and simple failure containment,
//! which is the right trade for low-frequency administrative record
//! operations.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::{GatewayError, Identity, TransactionReceipt};
use domain_records::{ContractSession, LedgerConnector};

use crate::error::LedgerInfraError;
use crate::profile::{ConnectionProfile, GatewayPeer};

/// Connector over the profile's gateway peer
#[derive(Debug, Clone)]
pub struct NetworkConnector {
    profile: ConnectionProfile,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl NetworkConnector {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the TCP/TLS handshake bound (default: 10s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-request bound (default: 30s)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the per-session HTTP client: rustls, the profile's CA, and
    /// the localhost-to-peer-hostname mapping when the profile overrides
    /// the TLS server name.
    fn build_client(&self, peer: &GatewayPeer) -> Result<(reqwest::Client, String), GatewayError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);

        if let Some(pem) = &peer.tls_ca_pem {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| LedgerInfraError::Tls(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }

        let mut endpoint = reqwest::Url::parse(&peer.endpoint)
            .map_err(|_| LedgerInfraError::MalformedPeerUrl(peer.endpoint.clone()))?;

        // Provisioning maps peers to localhost ports while their TLS
        // certificates carry the real peer hostname. Pin the hostname to
        // the profile address and request by hostname.
        if let Some(server_name) = &peer.tls_server_name {
            let host_ip = endpoint.host_str().and_then(|h| h.parse::<IpAddr>().ok());
            let resolved = match (host_ip, endpoint.host_str()) {
                (Some(ip), _) => Some(ip),
                (None, Some("localhost")) => Some(IpAddr::from([127, 0, 0, 1])),
                _ => None,
            };
            if let (Some(ip), Some(port)) = (resolved, endpoint.port_or_known_default()) {
                builder = builder.resolve(server_name, SocketAddr::new(ip, port));
                endpoint
                    .set_host(Some(server_name))
                    .map_err(|_| LedgerInfraError::Tls(format!(
                        "invalid ssl-target-name-override '{}'",
                        server_name
                    )))?;
            }
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::connection(format!("failed to build peer client: {}", e)))?;
        Ok((client, endpoint.to_string().trim_end_matches('/').to_string()))
    }
}

#[async_trait]
impl LedgerConnector for NetworkConnector {
    /// Opens a session against the gateway peer: fresh client, channel
    /// probe, then a `PeerSession` bound to the channel and contract.
    async fn acquire(
        &self,
        identity: &Identity,
        channel: &str,
        contract: &str,
    ) -> Result<Box<dyn ContractSession>, GatewayError> {
        let peer = self.profile.gateway_peer()?;
        let (client, endpoint) = self.build_client(&peer)?;

        let probe_url = format!("{}/api/channels/{}", endpoint, channel);
        let response = client
            .get(&probe_url)
            .send()
            .await
            .map_err(|e| connection_fault("channel probe", &e))?;
        if !response.status().is_success() {
            return Err(GatewayError::connection(format!(
                "channel '{}' probe failed with status {}",
                channel,
                response.status()
            )));
        }

        debug!(peer = %peer.name, channel, contract, msp_id = %identity.msp_id, "ledger session opened");
        Ok(Box::new(PeerSession {
            client,
            base: format!("{}/api/channels/{}/contracts/{}", endpoint, channel, contract),
            msp_id: identity.msp_id.clone(),
            certificate: identity.certificate.clone(),
            request_timeout: self.request_timeout,
            released: AtomicBool::new(false),
        }))
    }
}

/// One open session against the peer gateway endpoint
#[derive(Debug)]
pub struct PeerSession {
    client: reqwest::Client,
    base: String,
    msp_id: String,
    certificate: String,
    request_timeout: Duration,
    released: AtomicBool,
}

/// Wire shape of a transaction request to the peer gateway
#[derive(Serialize)]
struct TransactionRequest<'a> {
    function: &'a str,
    args: &'a [String],
    #[serde(rename = "mspId")]
    msp_id: &'a str,
    certificate: &'a str,
}

impl PeerSession {
    fn guard_released(&self) -> Result<(), GatewayError> {
        if self.released.load(Ordering::SeqCst) {
            Err(GatewayError::connection("session already released"))
        } else {
            Ok(())
        }
    }

    async fn post(
        &self,
        path: &str,
        function: &str,
        args: &[String],
    ) -> Result<reqwest::Response, GatewayError> {
        self.guard_released()?;
        let request = TransactionRequest {
            function,
            args,
            msp_id: &self.msp_id,
            certificate: &self.certificate,
        };
        self.client
            .post(format!("{}/{}", self.base, path))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_fault(function, self.request_timeout, &e))
    }
}

#[async_trait]
impl ContractSession for PeerSession {
    async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionReceipt, GatewayError> {
        let response = self.post("transactions", function, args).await?;
        let status = response.status();
        if status.is_success() {
            return response.json::<TransactionReceipt>().await.map_err(|e| {
                GatewayError::transaction(format!("malformed commit receipt: {}", e))
            });
        }
        Err(status_fault(function, status, response.text().await.ok()))
    }

    async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError> {
        let response = self.post("query", function, args).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response
                .bytes()
                .await
                .map_err(|e| transport_fault(function, self.request_timeout, &e))?
                .to_vec());
        }
        Err(status_fault(function, status, response.text().await.ok()))
    }

    async fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            debug!(base = %self.base, "ledger session released");
        }
    }
}

// Leak detector: a session dropped without release is a pipeline bug.
impl Drop for PeerSession {
    fn drop(&mut self) {
        if !self.released.load(Ordering::SeqCst) {
            warn!(base = %self.base, "ledger session dropped without release");
        }
    }
}

/// Maps a transport fault during session setup.
fn connection_fault(operation: &str, error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Connection {
            message: format!("{} timed out: {}", operation, error),
            timed_out: true,
        }
    } else {
        GatewayError::connection(format!("{} failed: {}", operation, error))
    }
}

/// Maps a transport fault on an open session.
fn transport_fault(function: &str, request_timeout: Duration, error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::transaction_timeout(function, request_timeout.as_millis() as u64)
    } else if error.is_connect() {
        GatewayError::connection(format!("{} failed: {}", function, error))
    } else {
        GatewayError::transaction(format!("{} failed: {}", function, error))
    }
}

/// Maps a peer-reported status: absent identifiers are NotFound, other
/// client errors are ledger rejections, server errors are network faults.
fn status_fault(function: &str, status: reqwest::StatusCode, body: Option<String>) -> GatewayError {
    let detail = body.filter(|b| !b.is_empty()).unwrap_or_else(|| status.to_string());
    if status == reqwest::StatusCode::NOT_FOUND {
        GatewayError::not_found(detail)
    } else if status.is_client_error() {
        GatewayError::transaction(format!("{} rejected: {}", function, detail))
    } else {
        GatewayError::connection(format!("{} failed: {}", function, detail))
    }
}
