//! Replay a trigger event through the handler.

use std::path::Path;

use adagg_connectors::{Handler, HandlerConfig};
use anyhow::{Context, Result};
use serde_json::Value;

use super::read_input;

pub async fn run(region: &str, endpoint: Option<String>, event_path: &Path) -> Result<()> {
    let raw = read_input(event_path).await?;
    let event: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", event_path.display()))?;

    let mut config = HandlerConfig::from_env().context("Invalid handler configuration")?;
    config.region = region.to_string();
    if endpoint.is_some() {
        config.endpoint = endpoint;
    }

    let handler = Handler::from_config(config);
    let response = handler.handle(&event).await.context("Invocation failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
