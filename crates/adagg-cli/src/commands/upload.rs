//! Upload a local batch file.

use std::path::Path;

use adagg_connectors::{ObjectLocation, ObjectSink, ObjectStorage};
use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tracing::info;

/// Newline-delimited JSON, the batch input format.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-ndjson";

pub struct UploadTarget {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
}

pub async fn run(
    region: &str,
    endpoint: Option<String>,
    file_path: &Path,
    target: &UploadTarget,
) -> Result<()> {
    // Checked up front so a typo never reaches the network.
    if !file_path.is_file() {
        bail!("File {} does not exist.", file_path.display());
    }

    let storage = ObjectStorage::new(region, endpoint);
    upload(&storage, file_path, target).await
}

/// Send `file_path` through `sink`.
pub async fn upload(sink: &dyn ObjectSink, file_path: &Path, target: &UploadTarget) -> Result<()> {
    let data = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let size = data.len();

    let location = ObjectLocation::new(target.bucket.as_str(), target.key.as_str());
    sink
        .write(&location, Bytes::from(data), &target.content_type, None)
        .await
        .context("Error uploading file")?;

    info!(
        location = %location,
        bytes = size,
        content_type = %target.content_type,
        "Upload complete"
    );
    println!("File {} uploaded to {}", file_path.display(), location);
    Ok(())
}
