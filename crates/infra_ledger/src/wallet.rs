//! File-System Wallet
//!
//! The identity keystore adapter: one JSON document per enrolled identity at
//! `<wallet_dir>/<alias>.id`, written by provisioning tooling and only ever
//! read here. Resolution is a pure read, safe under concurrent callers.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use core_kernel::{GatewayError, Identity};
use domain_records::IdentityStore;

use crate::error::LedgerInfraError;

/// Identity store over a provisioned wallet directory
///
/// # Example
///
/// ```rust,ignore
/// use infra_ledger::FileWallet;
///
/// let wallet = FileWallet::new("wallet");
/// let identity = wallet.resolve("appUser").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileWallet {
    dir: PathBuf,
}

/// Wire shape of one wallet identity file
#[derive(Debug, Deserialize)]
struct WalletIdentityFile {
    credentials: WalletCredentials,
    #[serde(rename = "mspId")]
    msp_id: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    identity_type: String,
}

#[derive(Debug, Deserialize)]
struct WalletCredentials {
    certificate: String,
    #[serde(rename = "privateKey")]
    private_key: String,
}

impl FileWallet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn identity_path(&self, alias: &str) -> PathBuf {
        self.dir.join(format!("{}.id", alias))
    }
}

#[async_trait]
impl IdentityStore for FileWallet {
    /// Resolves the credential enrolled under `alias`.
    ///
    /// A missing file means the alias was never enrolled
    /// (`IdentityNotFound`); an unreadable or unparsable file means the
    /// keystore artifact is corrupt (`Configuration`).
    async fn resolve(&self, alias: &str) -> Result<Identity, GatewayError> {
        let path = self.identity_path(alias);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GatewayError::identity_not_found(alias));
            }
            Err(e) => {
                return Err(LedgerInfraError::Io {
                    path: path.display().to_string(),
                    source: e,
                }
                .into());
            }
        };

        let file: WalletIdentityFile =
            serde_json::from_str(&raw).map_err(|e| LedgerInfraError::Malformed {
                path: path.display().to_string(),
                source: e,
            })?;

        debug!(alias, msp_id = %file.msp_id, "identity resolved from wallet");
        Ok(Identity::new(
            alias,
            file.msp_id,
            file.credentials.certificate,
            file.credentials.private_key,
        ))
    }
}
