//! Single-slot chain store backed by a JSON file.
//!
//! The file holds `{ "chain": ... }`. Writes go to a sibling temp file which is
//! fsynced and renamed over the original, so readers only ever see a complete
//! document.

use std::path::{Path, PathBuf};

use anyhow::Context;
use drip_core::error::{DripError, DripResult};
use drip_core::types::Chain;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    chain: Option<Chain>,
}

#[derive(Debug)]
pub struct ChainStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ChainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Chain store initialized");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last saved chain. A missing or unreadable document is treated as
    /// "nothing saved"; only I/O failures other than not-found are errors.
    pub async fn load(&self) -> DripResult<Option<Chain>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored chain yet");
                return Ok(None);
            }
            Err(e) => return Err(DripError::Io(e)),
        };

        match serde_json::from_slice::<StoredDocument>(&bytes) {
            Ok(doc) => Ok(doc.chain),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stored chain is corrupt, ignoring it");
                Ok(None)
            }
        }
    }

    /// Replaces the stored chain.
    pub async fn save(&self, chain: &Chain) -> DripResult<()> {
        let _guard = self.write_lock.lock().await;

        let bytes = serde_json::to_vec_pretty(&StoredDocument {
            chain: Some(chain.clone()),
        })?;
        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| DripError::Storage(format!("{e:#}")))?;

        info!(
            path = %self.path.display(),
            nodes = chain.nodes.len(),
            edges = chain.edges.len(),
            "Chain saved"
        );
        metrics::counter!("chain.saved").increment(1);
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;
    Ok(())
}
