//! Batch pipeline: raw object bytes in, [`ProcessReport`] out.
//!
//! ```text
//! bytes -> lines -> normalize_line -> Aggregator::fold -> SummaryResult
//!                        \
//!                         +-> RejectedLine (diagnostics)
//! ```
//!
//! Line-level and record-level problems are collected, never raised.

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, SummaryResult};
use crate::config::AggregationConfig;
use crate::error::Rejection;
use crate::normalize::normalize_line;

/// A line that was not folded, kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based line number in the input object.
    pub line_number: usize,
    pub raw: String,
    pub reason: Rejection,
}

/// Outcome of processing one input object.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub summary: SummaryResult,
    pub rejected: Vec<RejectedLine>,
    /// Non-blank lines seen.
    pub lines_read: usize,
    pub events_folded: u64,
}

/// Process a whole newline-delimited input object.
pub fn process(input: &[u8], config: &AggregationConfig) -> ProcessReport {
    let mut aggregator = Aggregator::new();
    let mut rejected = Vec::new();
    let mut lines_read = 0;

    for (idx, raw) in input.split(|b| *b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        lines_read += 1;
        let line_number = idx + 1;

        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                rejected.push(RejectedLine {
                    line_number,
                    raw: String::from_utf8_lossy(raw).into_owned(),
                    reason: Rejection::malformed(format!("invalid UTF-8: {}", e)),
                });
                continue;
            }
        };

        match normalize_line(line, config) {
            Ok(event) => aggregator.fold(&event),
            Err(reason) => rejected.push(RejectedLine {
                line_number,
                raw: line.to_string(),
                reason,
            }),
        }
    }

    let events_folded = aggregator.folded();
    ProcessReport {
        summary: aggregator.finish(),
        rejected,
        lines_read,
        events_folded,
    }
}

/// Convenience wrapper for already-decoded text.
pub fn process_str(input: &str, config: &AggregationConfig) -> ProcessReport {
    process(input.as_bytes(), config)
}
