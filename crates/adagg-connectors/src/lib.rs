//! adagg connectors: object storage plumbing around the core pipeline.
//!
//! ## Architecture
//!
//! - **Traits**: `ObjectSource` and `ObjectSink` are the ingestion and egress adapters.
//! - **Storage**: `ObjectStorage` implements both on top of `object_store` (S3 or in-memory).
//! - **Trigger**: `parse_trigger` unwraps a storage notification into an `ObjectLocation`.
//! - **Config**: `HandlerConfig` from a key-value map or the environment.
//! - **Handler**: `Handler` runs one invocation end to end.

pub mod config;
pub mod error;
pub mod handler;
pub mod storage;
pub mod traits;
pub mod trigger;

pub use config::{HandlerConfig, OutputKeyStrategy};
pub use error::{ConnectorError, Result};
pub use handler::{Handler, InvocationResponse};
pub use storage::ObjectStorage;
pub use traits::{ObjectLocation, ObjectSink, ObjectSource};
pub use trigger::parse_trigger;
