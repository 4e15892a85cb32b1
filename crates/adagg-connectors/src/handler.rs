//! Invocation handler.
//!
//! One invocation: unwrap the trigger, read the input object, run the batch
//! pipeline, encode the summary and write exactly one artifact. Any failure
//! before the write leaves the output bucket untouched.

use std::sync::Arc;

use adagg_core::{encode, pipeline};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::HandlerConfig;
use crate::error::Result;
use crate::storage::ObjectStorage;
use crate::traits::{ObjectLocation, ObjectSink, ObjectSource};
use crate::trigger::parse_trigger;

pub const COMPLETE_MESSAGE: &str = "Processing complete";

/// What the trigger runtime receives back from a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded string, as the trigger runtime expects.
    pub body: String,
    pub input: ObjectLocation,
    pub output: ObjectLocation,
    pub lines_read: usize,
    pub events_folded: u64,
    pub lines_rejected: usize,
}

pub struct Handler {
    config: HandlerConfig,
    source: Arc<dyn ObjectSource>,
    sink: Arc<dyn ObjectSink>,
}

impl Handler {
    pub fn new(
        config: HandlerConfig,
        source: Arc<dyn ObjectSource>,
        sink: Arc<dyn ObjectSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// A handler reading and writing through S3 as configured.
    pub fn from_config(config: HandlerConfig) -> Self {
        let storage = Arc::new(ObjectStorage::from_config(&config));
        Self::new(config, storage.clone(), storage)
    }

    pub async fn handle(&self, event: &Value) -> Result<InvocationResponse> {
        self.handle_at(event, Utc::now()).await
    }

    /// Like [`handle`](Self::handle) with an explicit processing time.
    pub async fn handle_at(&self, event: &Value, now: DateTime<Utc>) -> Result<InvocationResponse> {
        let input = parse_trigger(event)?;
        self.process_object(&input, now).await
    }

    pub async fn process_object(
        &self,
        input: &ObjectLocation,
        now: DateTime<Utc>,
    ) -> Result<InvocationResponse> {
        info!(input = %input, "Processing input object");

        let data = self.source.read(input).await?;
        let report = pipeline::process(&data, &self.config.aggregation);

        for rejected in &report.rejected {
            warn!(
                input = %input,
                line = rejected.line_number,
                kind = %rejected.reason.kind,
                detail = %rejected.reason.detail,
                "Rejected line"
            );
        }

        let artifact = encode::encode(&report.summary)?;
        let output = self.config.output_location(input, now);
        self.sink
            .write(
                &output,
                artifact,
                encode::CONTENT_TYPE,
                Some(encode::CONTENT_ENCODING),
            )
            .await?;

        info!(
            input = %input,
            output = %output,
            lines_read = report.lines_read,
            events_folded = report.events_folded,
            lines_rejected = report.rejected.len(),
            campaigns = report.summary.campaigns_stats.len(),
            devices = report.summary.device_stats_avg.len(),
            "Aggregated stats saved"
        );

        Ok(InvocationResponse {
            status_code: 200,
            body: serde_json::to_string(COMPLETE_MESSAGE)?,
            input: input.clone(),
            output,
            lines_read: report.lines_read,
            events_folded: report.events_folded,
            lines_rejected: report.rejected.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::TimeZone;
    use std::sync::Mutex;

    use crate::error::ConnectorError;

    struct StaticSource(&'static str);

    #[async_trait]
    impl ObjectSource for StaticSource {
        async fn read(&self, _location: &ObjectLocation) -> Result<Bytes> {
            Ok(Bytes::from_static(self.0.as_bytes()))
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        writes: Mutex<Vec<(ObjectLocation, Bytes, String, Option<String>)>>,
    }

    #[async_trait]
    impl ObjectSink for CapturingSink {
        async fn write(
            &self,
            location: &ObjectLocation,
            data: Bytes,
            content_type: &str,
            content_encoding: Option<&str>,
        ) -> Result<()> {
            self.writes.lock().unwrap().push((
                location.clone(),
                data,
                content_type.to_string(),
                content_encoding.map(str::to_string),
            ));
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl ObjectSink for FailingSink {
        async fn write(
            &self,
            location: &ObjectLocation,
            _data: Bytes,
            _content_type: &str,
            _content_encoding: Option<&str>,
        ) -> Result<()> {
            Err(ConnectorError::StorageWriteError {
                location: location.to_string(),
                message: "access denied".to_string(),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn direct(key: &str) -> Value {
        serde_json::json!({"bucket": "in", "key": key})
    }

    #[tokio::test]
    async fn test_handle_writes_summary() {
        let input = concat!(
            r#"{"campaign_id":"c1","client_price_amount":2.5,"device_type":"mobile","duration":10}"#,
            "\n",
            r#"{"campaign_id":"c1","client_price_amount":1.5,"device_type":"mobile","duration":20}"#,
            "\n",
            "not json\n",
        );
        let sink = Arc::new(CapturingSink::default());
        let handler = Handler::new(
            HandlerConfig::default(),
            Arc::new(StaticSource(input)),
            sink.clone(),
        );

        let response = handler.handle_at(&direct("batch.json"), now()).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "\"Processing complete\"");
        assert_eq!(response.lines_read, 3);
        assert_eq!(response.events_folded, 2);
        assert_eq!(response.lines_rejected, 1);
        assert_eq!(
            response.output.key,
            "2024/05/01/aggregated_stats.json.gz"
        );

        let writes = sink.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (location, data, content_type, encoding) = &writes[0];
        assert_eq!(location, &response.output);
        assert_eq!(content_type, "application/json");
        assert_eq!(encoding.as_deref(), Some("gzip"));

        let summary = encode::decode(data).unwrap();
        assert_eq!(summary.campaigns_stats["c1"].total_price, 4.0);
        assert_eq!(summary.device_stats_avg["mobile"].avg_duration, 15.0);
    }

    #[tokio::test]
    async fn test_response_serializes_status_code() {
        let handler = Handler::new(
            HandlerConfig::default(),
            Arc::new(StaticSource("")),
            Arc::new(CapturingSink::default()),
        );
        let response = handler.handle_at(&direct("empty.json"), now()).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "\"Processing complete\"");
        assert_eq!(json["events_folded"], 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_surfaced() {
        let handler = Handler::new(
            HandlerConfig::default(),
            Arc::new(StaticSource("{}\n")),
            Arc::new(FailingSink),
        );
        let err = handler.handle_at(&direct("k"), now()).await.unwrap_err();
        assert!(matches!(err, ConnectorError::StorageWriteError { .. }));
    }

    #[tokio::test]
    async fn test_bad_trigger_writes_nothing() {
        let sink = Arc::new(CapturingSink::default());
        let handler = Handler::new(
            HandlerConfig::default(),
            Arc::new(StaticSource("{}\n")),
            sink.clone(),
        );
        let err = handler
            .handle_at(&serde_json::json!({"Records": []}), now())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidEventStructure(_)));
        assert!(sink.writes.lock().unwrap().is_empty());
    }
}
