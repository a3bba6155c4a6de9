//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure a writable directory exists, creating it (and parents) if missing.
pub async fn ensure_dir(dir: &str) -> anyhow::Result<()> {
    if dir.trim().is_empty() {
        return Err(anyhow::anyhow!("directory path is empty"));
    }
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{dir} exists but is not a directory")),
        Err(_) => {
            warn!(%dir, "directory not found; creating it");
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
            info!(%dir, "directory created");
            Ok(())
        }
    }
}
