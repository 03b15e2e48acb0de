use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use warden_core::AuditEntry;

use crate::error::AuditError;

struct FallbackInner {
    file: File,
    last_sync: Instant,
}

/// Newline-delimited JSON spillover file.
///
/// Appends are line-atomic under a single-writer lock; `fsync` runs at a
/// configurable cadence rather than per line.
pub struct FallbackFile {
    path: PathBuf,
    inner: Mutex<FallbackInner>,
    sync_interval: Duration,
}

impl FallbackFile {
    /// Open (creating if needed) the fallback file at `path`.
    pub async fn open(path: &Path, sync_interval: Duration) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuditError::Fallback(format!("{}: {e}", parent.display())))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| AuditError::Fallback(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "fallback file opened");
        Ok(Self {
            path: path.to_owned(),
            inner: Mutex::new(FallbackInner {
                file,
                last_sync: Instant::now(),
            }),
            sync_interval,
        })
    }

    /// Path of the fallback file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single JSON line.
    pub async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.append_many(std::slice::from_ref(entry)).await
    }

    /// Append a batch of entries, one JSON line each, in order.
    pub async fn append_many(&self, entries: &[AuditEntry]) -> Result<(), AuditError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for entry in entries {
            serde_json::to_writer(&mut buf, entry)
                .map_err(|e| AuditError::Fallback(e.to_string()))?;
            buf.push(b'\n');
        }

        let mut inner = self.inner.lock().await;
        inner
            .file
            .write_all(&buf)
            .await
            .map_err(|e| AuditError::Fallback(e.to_string()))?;
        inner
            .file
            .flush()
            .await
            .map_err(|e| AuditError::Fallback(e.to_string()))?;

        if inner.last_sync.elapsed() >= self.sync_interval {
            if let Err(e) = inner.file.sync_data().await {
                warn!(error = %e, "fallback fsync failed");
            }
            inner.last_sync = Instant::now();
        }
        Ok(())
    }

    /// Force an fsync regardless of cadence. Called on shutdown.
    pub async fn sync(&self) -> Result<(), AuditError> {
        let mut inner = self.inner.lock().await;
        inner
            .file
            .sync_data()
            .await
            .map_err(|e| AuditError::Fallback(e.to_string()))?;
        inner.last_sync = Instant::now();
        Ok(())
    }
}

impl std::fmt::Debug for FallbackFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use warden_core::{AuditEntryKind, ClientId, GatewayContext};

    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "warden-fallback-{tag}-{}.ndjson",
            std::process::id()
        ))
    }

    fn entry(client: &str) -> AuditEntry {
        AuditEntry::gateway_context(GatewayContext::new(
            ClientId::new(client),
            ChronoDuration::minutes(5),
        ))
    }

    #[tokio::test]
    async fn appends_one_json_line_per_entry() {
        let path = temp_path("lines");
        let _ = std::fs::remove_file(&path);

        let file = FallbackFile::open(&path, Duration::from_secs(1)).await.unwrap();
        file.append(&entry("c1")).await.unwrap();
        file.append_many(&[entry("c2"), entry("c3")]).await.unwrap();
        file.sync().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: AuditEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.client_id.as_str(), "c1");
        assert!(matches!(first.kind, AuditEntryKind::GatewayContext(_)));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn reopen_appends_not_truncates() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let file = FallbackFile::open(&path, Duration::from_secs(1)).await.unwrap();
            file.append(&entry("c1")).await.unwrap();
        }
        {
            let file = FallbackFile::open(&path, Duration::from_secs(1)).await.unwrap();
            file.append(&entry("c2")).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_batch_is_noop() {
        let path = temp_path("empty");
        let _ = std::fs::remove_file(&path);

        let file = FallbackFile::open(&path, Duration::from_secs(1)).await.unwrap();
        file.append_many(&[]).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
