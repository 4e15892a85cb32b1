//! Object-store backed [`ObjectSource`] and [`ObjectSink`].
//!
//! One `object_store` client is built lazily per bucket and cached. Tests (and
//! the CLI's local mode) register pre-built stores with [`ObjectStorage::with_store`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::HandlerConfig;
use crate::error::{ConnectorError, Result};
use crate::traits::{ObjectLocation, ObjectSink, ObjectSource};

/// S3 (or S3-compatible) storage addressed by bucket and key.
pub struct ObjectStorage {
    region: String,
    endpoint: Option<String>,
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStorage {
    pub fn new(region: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            region: region.into(),
            endpoint,
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &HandlerConfig) -> Self {
        Self::new(config.region.clone(), config.endpoint.clone())
    }

    /// Use `store` for every access to `bucket` instead of building an S3 client.
    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.get_mut().insert(bucket.into(), store);
        self
    }

    async fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        if let Some(store) = self.stores.read().await.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let mut stores = self.stores.write().await;
        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&self.region);
        if let Some(endpoint) = &self.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        let store: Arc<dyn ObjectStore> = Arc::new(builder.build().map_err(|e| {
            ConnectorError::ConfigError(format!(
                "failed to build S3 client for bucket '{}': {}",
                bucket, e
            ))
        })?);

        debug!(bucket = %bucket, region = %self.region, "Built S3 client");
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

#[async_trait]
impl ObjectSource for ObjectStorage {
    async fn read(&self, location: &ObjectLocation) -> Result<Bytes> {
        let read_error = |message: String| ConnectorError::StorageReadError {
            location: location.to_string(),
            message,
        };

        let store = self.store_for(&location.bucket).await?;
        let path = ObjectPath::from(location.key.as_str());
        let result = store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => read_error("object not found".to_string()),
            other => read_error(other.to_string()),
        })?;
        let data = result.bytes().await.map_err(|e| read_error(e.to_string()))?;

        debug!(location = %location, bytes = data.len(), "Read input object");
        Ok(data)
    }
}

#[async_trait]
impl ObjectSink for ObjectStorage {
    async fn write(
        &self,
        location: &ObjectLocation,
        data: Bytes,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> Result<()> {
        let store = self.store_for(&location.bucket).await?;
        let path = ObjectPath::from(location.key.as_str());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        if let Some(encoding) = content_encoding {
            attributes.insert(Attribute::ContentEncoding, encoding.to_string().into());
        }
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let size = data.len();
        store
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(|e| ConnectorError::StorageWriteError {
                location: location.to_string(),
                message: e.to_string(),
            })?;

        debug!(location = %location, bytes = size, "Wrote output object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn storage_with(bucket: &str) -> (ObjectStorage, Arc<InMemory>) {
        let mem = Arc::new(InMemory::new());
        let storage = ObjectStorage::new("us-east-1", None).with_store(bucket, mem.clone());
        (storage, mem)
    }

    #[tokio::test]
    async fn test_read_existing_object() {
        let (storage, mem) = storage_with("in");
        mem.put(&ObjectPath::from("batch.json"), PutPayload::from_static(b"{}\n"))
            .await
            .unwrap();

        let data = storage
            .read(&ObjectLocation::new("in", "batch.json"))
            .await
            .unwrap();
        assert_eq!(data, Bytes::from_static(b"{}\n"));
    }

    #[tokio::test]
    async fn test_read_missing_object() {
        let (storage, _mem) = storage_with("in");
        let err = storage
            .read(&ObjectLocation::new("in", "nope.json"))
            .await
            .unwrap_err();
        match err {
            ConnectorError::StorageReadError { location, message } => {
                assert_eq!(location, "s3://in/nope.json");
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_write_sets_attributes() {
        let (storage, mem) = storage_with("out");
        storage
            .write(
                &ObjectLocation::new("out", "a/b.json.gz"),
                Bytes::from_static(b"\x1f\x8b"),
                "application/json",
                Some("gzip"),
            )
            .await
            .unwrap();

        let got = mem.get(&ObjectPath::from("a/b.json.gz")).await.unwrap();
        let attrs = got.attributes.clone();
        assert_eq!(
            attrs.get(&Attribute::ContentType).map(|v| -> &str { v.as_ref() }),
            Some("application/json")
        );
        assert_eq!(
            attrs.get(&Attribute::ContentEncoding).map(|v| -> &str { v.as_ref() }),
            Some("gzip")
        );
        assert_eq!(got.bytes().await.unwrap(), Bytes::from_static(b"\x1f\x8b"));
    }

    #[tokio::test]
    async fn test_buckets_are_isolated() {
        let storage = ObjectStorage::new("us-east-1", None)
            .with_store("in", Arc::new(InMemory::new()))
            .with_store("out", Arc::new(InMemory::new()));
        storage
            .write(&ObjectLocation::new("out", "k"), Bytes::from("x"), "text/plain", None)
            .await
            .unwrap();
        assert!(storage.read(&ObjectLocation::new("in", "k")).await.is_err());
        assert!(storage.read(&ObjectLocation::new("out", "k")).await.is_ok());
    }
}
