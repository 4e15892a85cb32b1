//! Command handlers for adaggctl
//!
//! - Upload: put a local file into object storage
//! - Aggregate: local, offline pipeline run
//! - Process: one handler invocation from a trigger event

pub mod aggregate;
pub mod process;
pub mod upload;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// Read a whole file, or stdin when the path is `-`.
pub(crate) async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
