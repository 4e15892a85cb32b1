//! Handler configuration.
//!
//! ## Configuration
//!
//! | Key                   | Env var               | Description                                   | Default                          |
//! |-----------------------|-----------------------|-----------------------------------------------|----------------------------------|
//! | `output.bucket`       | `OUTPUT_BUCKET`       | Bucket receiving the summary artifact         | `video-event-bucket-aggregated`  |
//! | `output.prefix`       | `OUTPUT_PREFIX`       | Optional key prefix for the artifact          | none                             |
//! | `output.key_strategy` | `OUTPUT_KEY_STRATEGY` | `processing_date` or `input_identity`         | `processing_date`                |
//! | `s3.region`           | `AWS_REGION`          | AWS region                                    | `us-east-1`                      |
//! | `s3.endpoint`         | `S3_ENDPOINT`         | Custom endpoint (MinIO/localstack)            | none                             |
//! | `validation.mode`     | `VALIDATION_MODE`     | `lenient` or `strict`                         | `lenient`                        |
//! | `campaign.policy`     | `CAMPAIGN_POLICY`     | `aggregate` or `drop` for undefined campaigns | `aggregate`                      |

use std::collections::HashMap;
use std::fmt;

use adagg_core::{AggregationConfig, CampaignPolicy, ValidationMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};
use crate::traits::ObjectLocation;

pub const DEFAULT_OUTPUT_BUCKET: &str = "video-event-bucket-aggregated";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const ARTIFACT_NAME: &str = "aggregated_stats.json.gz";

/// Environment variable to config-map key.
const ENV_KEYS: [(&str, &str); 7] = [
    ("OUTPUT_BUCKET", "output.bucket"),
    ("OUTPUT_PREFIX", "output.prefix"),
    ("OUTPUT_KEY_STRATEGY", "output.key_strategy"),
    ("AWS_REGION", "s3.region"),
    ("S3_ENDPOINT", "s3.endpoint"),
    ("VALIDATION_MODE", "validation.mode"),
    ("CAMPAIGN_POLICY", "campaign.policy"),
];

/// How the output object key is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKeyStrategy {
    /// `YYYY/MM/DD/aggregated_stats.json.gz` from the UTC processing time.
    /// A retried delivery of the same input writes to whatever day it runs on.
    #[default]
    ProcessingDate,
    /// `<input key>/aggregated_stats.json.gz`. Retries overwrite the same object.
    InputIdentity,
}

impl OutputKeyStrategy {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "processing_date" | "date" => Ok(OutputKeyStrategy::ProcessingDate),
            "input_identity" | "input" => Ok(OutputKeyStrategy::InputIdentity),
            other => Err(ConnectorError::ConfigError(format!(
                "unknown output key strategy: '{}'",
                other
            ))),
        }
    }

    /// Build the artifact key, without any prefix.
    pub fn key_for(&self, input: &ObjectLocation, now: DateTime<Utc>) -> String {
        match self {
            OutputKeyStrategy::ProcessingDate => {
                format!("{}/{}", now.format("%Y/%m/%d"), ARTIFACT_NAME)
            }
            OutputKeyStrategy::InputIdentity => {
                format!("{}/{}", input.key.trim_matches('/'), ARTIFACT_NAME)
            }
        }
    }
}

impl fmt::Display for OutputKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKeyStrategy::ProcessingDate => write!(f, "processing_date"),
            OutputKeyStrategy::InputIdentity => write!(f, "input_identity"),
        }
    }
}

/// Configuration for one [`Handler`](crate::handler::Handler).
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerConfig {
    pub output_bucket: String,
    pub output_prefix: Option<String>,
    pub key_strategy: OutputKeyStrategy,
    pub region: String,
    pub endpoint: Option<String>,
    pub aggregation: AggregationConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            output_bucket: DEFAULT_OUTPUT_BUCKET.to_string(),
            output_prefix: None,
            key_strategy: OutputKeyStrategy::default(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            aggregation: AggregationConfig::default(),
        }
    }
}

impl HandlerConfig {
    /// Parse a HandlerConfig from a string key-value map. Every key is optional.
    pub fn from_config_map(config: &HashMap<String, String>) -> Result<Self> {
        let non_empty = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let key_strategy = non_empty("output.key_strategy")
            .map(|s| OutputKeyStrategy::from_str_config(&s))
            .transpose()?
            .unwrap_or_default();

        let validation_mode = non_empty("validation.mode")
            .map(|s| ValidationMode::from_str_config(&s))
            .transpose()?
            .unwrap_or_default();

        let campaign_policy = non_empty("campaign.policy")
            .map(|s| CampaignPolicy::from_str_config(&s))
            .transpose()?
            .unwrap_or_default();

        Ok(HandlerConfig {
            output_bucket: non_empty("output.bucket")
                .unwrap_or_else(|| DEFAULT_OUTPUT_BUCKET.to_string()),
            output_prefix: non_empty("output.prefix")
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            key_strategy,
            region: non_empty("s3.region").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: non_empty("s3.endpoint"),
            aggregation: AggregationConfig {
                validation_mode,
                campaign_policy,
            },
        })
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(std::env::vars())
    }

    /// Load from an explicit set of environment variables.
    pub fn from_env_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let map = ENV_KEYS
            .iter()
            .filter_map(|(env, key)| vars.get(*env).map(|v| (key.to_string(), v.clone())))
            .collect();
        Self::from_config_map(&map)
    }

    /// Where the artifact for `input` goes when processed at `now`.
    pub fn output_location(&self, input: &ObjectLocation, now: DateTime<Utc>) -> ObjectLocation {
        let key = self.key_strategy.key_for(input, now);
        let key = match &self.output_prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key,
        };
        ObjectLocation::new(self.output_bucket.clone(), key)
    }
}
