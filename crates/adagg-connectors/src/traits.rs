//! Storage adapter traits.
//!
//! The handler reads its input through an [`ObjectSource`] and writes its
//! artifact through an [`ObjectSink`]. Both are object-safe so tests can swap
//! in fakes without touching the aggregation flow.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A bucket/key pair identifying one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Ingestion adapter: fetch the raw bytes of an input object.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fails with `StorageReadError` on missing objects, permissions, or network issues.
    async fn read(&self, location: &ObjectLocation) -> Result<Bytes>;
}

/// Egress adapter: store an output object.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Fails with `StorageWriteError`.
    async fn write(
        &self,
        location: &ObjectLocation,
        data: Bytes,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> Result<()>;
}
