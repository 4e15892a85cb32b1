//! Output encoding for the summary artifact.
//!
//! The artifact is the JSON form of a [`SummaryResult`] (two top-level keys,
//! `campaigns_stats` and `device_stats_avg`, lexicographically ordered)
//! compressed as a single gzip member.
//!
//! JSON has no representation for infinity or NaN, so a summary whose totals
//! overflowed is refused instead of written with nulls.

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::aggregate::SummaryResult;
use crate::error::{Error, Result};

pub const CONTENT_TYPE: &str = "application/json";
pub const CONTENT_ENCODING: &str = "gzip";

/// Serialize the summary to its uncompressed JSON document.
pub fn to_json(summary: &SummaryResult) -> Result<Vec<u8>> {
    ensure_finite(summary)?;
    Ok(serde_json::to_vec(summary)?)
}

fn ensure_finite(summary: &SummaryResult) -> Result<()> {
    let not_finite = |group: &str, key: &str, field: &str, value: f64| {
        Error::Serialization(format!(
            "{} '{}' {} is not finite ({})",
            group, key, field, value
        ))
    };

    for (key, stat) in &summary.campaigns_stats {
        if !stat.total_price.is_finite() {
            return Err(not_finite("campaign", key, "total_price", stat.total_price));
        }
    }
    for (key, stat) in &summary.device_stats_avg {
        if !stat.total_duration.is_finite() {
            return Err(not_finite("device", key, "total_duration", stat.total_duration));
        }
        if !stat.avg_duration.is_finite() {
            return Err(not_finite("device", key, "avg_duration", stat.avg_duration));
        }
    }
    Ok(())
}

/// Serialize and gzip the summary.
pub fn encode(summary: &SummaryResult) -> Result<Bytes> {
    let json = to_json(summary)?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| Error::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::Compression(e.to_string()))?;

    Ok(Bytes::from(compressed))
}

/// Reverse of [`encode`].
pub fn decode(data: &[u8]) -> Result<SummaryResult> {
    let mut decoder = GzDecoder::new(data);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{CampaignStat, DeviceStat};

    fn sample_summary() -> SummaryResult {
        let mut summary = SummaryResult::default();
        summary.campaigns_stats.insert(
            "c1".to_string(),
            CampaignStat {
                total_price: 4.0,
                count: 2,
            },
        );
        summary.campaigns_stats.insert(
            "undefined".to_string(),
            CampaignStat {
                total_price: 0.1 + 0.2,
                count: 2,
            },
        );
        summary.device_stats_avg.insert(
            "mobile".to_string(),
            DeviceStat {
                total_duration: 30.0,
                count: 2,
                avg_duration: 15.0,
            },
        );
        summary
    }

    #[test]
    fn test_gzip_magic() {
        let data = encode(&sample_summary()).unwrap();
        assert!(data.len() > 2);
        assert_eq!(&data[0..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_decode_reproduces_summary() {
        let summary = sample_summary();
        let decoded = decode(&encode(&summary).unwrap()).unwrap();
        assert_eq!(decoded, summary);
    }

    #[test]
    fn test_empty_summary_document() {
        let summary = SummaryResult::default();
        let json = to_json(&summary).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"campaigns_stats":{},"device_stats_avg":{}}"#
        );
        assert_eq!(decode(&encode(&summary).unwrap()).unwrap(), summary);
    }

    #[test]
    fn test_document_shape() {
        let json = to_json(&sample_summary()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let top: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(top, vec!["campaigns_stats", "device_stats_avg"]);
        assert_eq!(value["campaigns_stats"]["c1"]["total_price"], 4.0);
        assert_eq!(value["campaigns_stats"]["c1"]["count"], 2);
        assert_eq!(value["device_stats_avg"]["mobile"]["avg_duration"], 15.0);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode(&sample_summary()).unwrap();
        let b = encode(&sample_summary()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overflowed_totals_are_refused() {
        let mut summary = sample_summary();
        summary.campaigns_stats.insert(
            "big".to_string(),
            CampaignStat {
                total_price: f64::MAX + f64::MAX,
                count: 2,
            },
        );
        let err = encode(&summary).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().contains("campaign 'big' total_price"));

        let mut summary = sample_summary();
        summary.device_stats_avg.insert(
            "tv".to_string(),
            DeviceStat {
                total_duration: f64::INFINITY,
                count: 1,
                avg_duration: f64::INFINITY,
            },
        );
        assert!(matches!(to_json(&summary), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }
}
