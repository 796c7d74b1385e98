//! Environment/runtime helpers
//!
//! Sanity checks to ensure the directories a file-backed store writes into exist.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the parent directory of `file_path` exists, creating it if needed.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let Some(parent) = Path::new(file_path).parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    if tokio::fs::metadata(parent).await.is_ok() {
        return Ok(());
    }
    warn!(dir = %parent.display(), "data directory missing; creating it");
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    info!(dir = %parent.display(), "data directory created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_parent_dir;

    #[tokio::test]
    async fn creates_missing_parent() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4()));
        let file = root.join("nested").join("projects.json");
        ensure_parent_dir(file.to_str().unwrap_or_default()).await?;
        assert!(tokio::fs::metadata(root.join("nested")).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_is_noop() -> anyhow::Result<()> {
        ensure_parent_dir("projects.json").await?;
        Ok(())
    }
}
