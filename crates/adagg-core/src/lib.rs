//! adagg core: validation and aggregation of ad impression batches.
//!
//! Pure, synchronous building blocks with no I/O:
//!
//! - [`normalize`]: one raw line to an [`Event`] or a [`Rejection`]
//! - [`aggregate`]: fold events into per-campaign and per-device statistics
//! - [`encode`]: gzip-compressed JSON artifact for a [`SummaryResult`]
//! - [`pipeline`]: whole input object to a [`ProcessReport`]

pub mod aggregate;
pub mod config;
pub mod encode;
pub mod error;
pub mod event;
pub mod normalize;
pub mod pipeline;

pub use aggregate::{Aggregator, CampaignStat, DeviceStat, SummaryResult};
pub use config::{AggregationConfig, CampaignPolicy, ValidationMode};
pub use error::{Error, Rejection, RejectionKind, Result};
pub use event::{Dimension, Event, UNDEFINED};
pub use normalize::normalize_line;
pub use pipeline::{process, process_str, ProcessReport, RejectedLine};
