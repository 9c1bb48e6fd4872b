//! Connection Profile
//!
//! The network topology descriptor: a structured JSON document naming the
//! client organization, its peers, and their endpoints and TLS material.
//! Produced by provisioning tooling, loaded read-only once at startup, and
//! never mutated.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use core_kernel::GatewayError;

use crate::error::LedgerInfraError;

/// A parsed connection profile
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub client: ClientSection,
    pub organizations: HashMap<String, Organization>,
    #[serde(default)]
    pub peers: HashMap<String, PeerEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    /// The organization this process connects through
    pub organization: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerEndpoint {
    pub url: String,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,
    #[serde(rename = "grpcOptions", default)]
    pub grpc_options: GrpcOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsCaCerts {
    #[serde(default)]
    pub pem: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrpcOptions {
    /// Hostname the peer's TLS certificate is issued for, when it differs
    /// from the endpoint host (provisioning maps peers to localhost ports)
    #[serde(rename = "ssl-target-name-override", default)]
    pub ssl_target_name_override: Option<String>,
}

/// The resolved peer the connector talks to
#[derive(Debug, Clone)]
pub struct GatewayPeer {
    pub name: String,
    /// HTTP(S) endpoint, mapped from the profile's grpc(s) URL
    pub endpoint: String,
    pub tls_ca_pem: Option<String>,
    pub tls_server_name: Option<String>,
}

impl ConnectionProfile {
    /// Loads and parses a profile document.
    ///
    /// # Errors
    ///
    /// `GatewayError::Configuration` when the file cannot be read or does
    /// not parse - the provisioned artifact is broken, not the network.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LedgerInfraError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        let profile = serde_json::from_str(&raw).map_err(|e| LedgerInfraError::Malformed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(profile)
    }

    /// Parses a profile from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, GatewayError> {
        let profile = serde_json::from_str(raw).map_err(|e| LedgerInfraError::Malformed {
            path: "<inline>".to_string(),
            source: e,
        })?;
        Ok(profile)
    }

    /// Resolves the client organization's gateway peer: the first peer the
    /// organization declares.
    ///
    /// # Errors
    ///
    /// `LedgerInfraError::NoGatewayPeer` when the client organization is
    /// not declared, declares no peers, or names a peer the profile has no
    /// entry for; `MalformedPeerUrl` when the peer URL scheme is not
    /// recognized.
    pub fn gateway_peer(&self) -> Result<GatewayPeer, LedgerInfraError> {
        let org_name = &self.client.organization;
        let org = self.organizations.get(org_name).ok_or_else(|| {
            LedgerInfraError::NoGatewayPeer(format!(
                "client organization '{}' is not declared",
                org_name
            ))
        })?;
        let peer_name = org.peers.first().ok_or_else(|| {
            LedgerInfraError::NoGatewayPeer(format!("organization '{}' declares no peers", org_name))
        })?;
        let peer = self.peers.get(peer_name).ok_or_else(|| {
            LedgerInfraError::NoGatewayPeer(format!("peer '{}' has no endpoint entry", peer_name))
        })?;

        Ok(GatewayPeer {
            name: peer_name.clone(),
            endpoint: http_endpoint(&peer.url)?,
            tls_ca_pem: peer.tls_ca_certs.as_ref().and_then(|t| t.pem.clone()),
            tls_server_name: peer.grpc_options.ssl_target_name_override.clone(),
        })
    }
}

/// Maps a profile peer URL onto the HTTP peer gateway endpoint:
/// `grpcs://` becomes `https://`, `grpc://` becomes `http://`, and HTTP
/// URLs pass through unchanged.
fn http_endpoint(url: &str) -> Result<String, LedgerInfraError> {
    if let Some(rest) = url.strip_prefix("grpcs://") {
        Ok(format!("https://{}", rest))
    } else if let Some(rest) = url.strip_prefix("grpc://") {
        Ok(format!("http://{}", rest))
    } else if url.starts_with("https://") || url.starts_with("http://") {
        Ok(url.to_string())
    } else {
        Err(LedgerInfraError::MalformedPeerUrl(url.to_string()))
    }
}
