//! Aggregation Configuration
//!
//! Controls how raw lines are validated before they are folded:
//!
//! - **validation_mode**: `lenient` fills every gap with defaults (default),
//!   `strict` rejects records missing a field required for aggregation
//! - **campaign_policy**: what happens to records whose `campaign_id` is
//!   undefined: `aggregate` keeps them under `"undefined"` (default), `drop`
//!   rejects them before they reach either accumulator
//!
//! ## Usage
//!
//! ```ignore
//! use adagg_core::{AggregationConfig, CampaignPolicy};
//!
//! let config = AggregationConfig {
//!     campaign_policy: CampaignPolicy::Drop,
//!     ..Default::default()
//! };
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

impl ValidationMode {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(Error::InvalidConfig(format!(
                "unknown validation mode: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Lenient => write!(f, "lenient"),
            ValidationMode::Strict => write!(f, "strict"),
        }
    }
}

/// Treatment of records whose campaign_id is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignPolicy {
    #[default]
    Aggregate,
    Drop,
}

impl CampaignPolicy {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "aggregate" | "keep" => Ok(CampaignPolicy::Aggregate),
            "drop" => Ok(CampaignPolicy::Drop),
            other => Err(Error::InvalidConfig(format!(
                "unknown campaign policy: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for CampaignPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignPolicy::Aggregate => write!(f, "aggregate"),
            CampaignPolicy::Drop => write!(f, "drop"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub validation_mode: ValidationMode,

    #[serde(default)]
    pub campaign_policy: CampaignPolicy,
}
