//! adagg CLI (adaggctl)
//!
//! Command-line tool around the ad impression aggregation pipeline.
//!
//! ## Overview
//!
//! - **upload**: put a local batch file into a bucket, which fires the storage trigger
//! - **aggregate**: run the pipeline over a local file, no network involved
//! - **process**: run one handler invocation from a trigger event file
//!
//! ## Quick Start
//!
//! ```bash
//! # Upload a batch
//! adaggctl upload video-event-bucket ./events.json 2024/05/01/batch-1.json
//!
//! # Aggregate locally and print the summary
//! adaggctl aggregate ./events.json
//!
//! # Write the gzip artifact instead
//! adaggctl aggregate ./events.json --output aggregated_stats.json.gz
//!
//! # Replay a storage notification
//! adaggctl process --event ./notification.json
//! ```
//!
//! ## Configuration
//!
//! `process` reads the handler environment (`OUTPUT_BUCKET`, `OUTPUT_PREFIX`,
//! `OUTPUT_KEY_STRATEGY`, `VALIDATION_MODE`, `CAMPAIGN_POLICY`). `AWS_REGION` and
//! `S3_ENDPOINT` are also exposed as global flags. Log level comes from `RUST_LOG`
//! (default `info`); logs go to stderr.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "adaggctl")]
#[command(about = "Ad impression aggregation tool", long_about = None)]
struct Cli {
    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Custom S3 endpoint (MinIO, localstack)
    #[arg(long, global = true, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file to a bucket
    Upload {
        /// Destination bucket
        bucket: String,
        /// Local file to upload
        file_path: PathBuf,
        /// Destination key
        key: String,
        /// Content type stored with the object
        #[arg(long, default_value = commands::upload::DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },
    /// Aggregate a local newline-delimited JSON file
    Aggregate {
        /// Input file, `-` for stdin
        file: PathBuf,
        /// Write the gzip artifact here instead of printing the summary
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Require the core fields and JSON numbers
        #[arg(long)]
        strict: bool,
        /// Reject records without a campaign_id
        #[arg(long)]
        drop_undefined_campaigns: bool,
        /// Also print each rejected line to stdout
        #[arg(long)]
        show_rejected: bool,
    },
    /// Run one handler invocation for a trigger event
    Process {
        /// Trigger event JSON file, `-` for stdin
        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            bucket,
            file_path,
            key,
            content_type,
        } => {
            let target = commands::upload::UploadTarget {
                bucket,
                key,
                content_type,
            };
            commands::upload::run(&cli.region, cli.endpoint, &file_path, &target).await?
        }
        Commands::Aggregate {
            file,
            output,
            strict,
            drop_undefined_campaigns,
            show_rejected,
        } => commands::aggregate::run(commands::aggregate::AggregateArgs {
            file,
            output,
            strict,
            drop_undefined_campaigns,
            show_rejected,
        })
        .await?,
        Commands::Process { event } => {
            commands::process::run(&cli.region, cli.endpoint, &event).await?
        }
    }

    Ok(())
}
