//! Atomic file replacement

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Sibling temp path: `patients.json` -> `patients.json.tmp`
pub fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Write `contents` to a temp file beside `target`, fsync, then rename over it
///
/// Readers see either the old file or the new one, never a partial write.
pub async fn write_atomic(target: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = temp_path(target);
    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, target).await
    }
    .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            warn!("Failed to remove temp file {}: {}", tmp.display(), e);
        }
    }
    result
}
