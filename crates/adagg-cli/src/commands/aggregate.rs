//! Offline aggregation of a local file.

use std::path::PathBuf;

use adagg_core::{encode, pipeline, AggregationConfig, CampaignPolicy, ValidationMode};
use anyhow::{Context, Result};
use tracing::{info, warn};

use super::read_input;

pub struct AggregateArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub drop_undefined_campaigns: bool,
    pub show_rejected: bool,
}

impl AggregateArgs {
    fn config(&self) -> AggregationConfig {
        AggregationConfig {
            validation_mode: if self.strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            },
            campaign_policy: if self.drop_undefined_campaigns {
                CampaignPolicy::Drop
            } else {
                CampaignPolicy::Aggregate
            },
        }
    }
}

pub async fn run(args: AggregateArgs) -> Result<()> {
    let input = read_input(&args.file).await?;
    let report = pipeline::process(&input, &args.config());

    for rejected in &report.rejected {
        warn!(
            line = rejected.line_number,
            kind = %rejected.reason.kind,
            detail = %rejected.reason.detail,
            "Rejected line"
        );
        if args.show_rejected {
            println!("line {}: {}", rejected.line_number, rejected.reason);
        }
    }

    info!(
        lines_read = report.lines_read,
        events_folded = report.events_folded,
        lines_rejected = report.rejected.len(),
        "Aggregation complete"
    );

    match &args.output {
        Some(path) => {
            let artifact = encode::encode(&report.summary).context("Failed to encode summary")?;
            tokio::fs::write(path, &artifact)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Aggregated stats saved to {}", path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
        }
    }
    Ok(())
}
