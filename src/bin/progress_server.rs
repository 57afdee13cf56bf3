// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Growth Progress Server Binary
//!
//! Starts the HTTP API for levels, streaks, aggregation and weekly insights.

use anyhow::{Context, Result};
use clap::Parser;
use growth_progress::{
    config::{ProgressConfig, ServerConfig},
    logging,
    progress::{insights::InsightGeneratorConfig, HttpTextGenerationClient, TextGenerationClient, WeeklyInsightGenerator},
    server::ProgressServer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "growth-progress-server")]
#[command(about = "Progress engine HTTP server for a personal-growth journaling app")]
pub struct Args {
    /// Port to listen on (overrides HTTP_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides HTTP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Progress rules file (overrides PROGRESS_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // LOG_FORMAT and friends may come from .env
    dotenv::dotenv().ok();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env().context("Failed to load server configuration")?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(host) = args.host {
        config.http_host = host;
    }
    if let Some(path) = args.config {
        config.progress_config_path = Some(path);
    }

    info!("{}", config.summary());

    let progress = ProgressConfig::load(config.progress_config_path.as_deref())
        .context("Failed to load progress rules")?;

    let client: Option<Arc<dyn TextGenerationClient>> =
        match HttpTextGenerationClient::from_config(&config.enrichment) {
            Ok(Some(client)) => Some(Arc::new(client)),
            Ok(None) => {
                warn!("Text generation service not configured; weekly insights use the deterministic summary");
                None
            }
            Err(e) => {
                warn!("Failed to build text generation client, continuing without enrichment: {}", e);
                None
            }
        };

    let generator = WeeklyInsightGenerator::with_config(
        client,
        InsightGeneratorConfig::from(&config.enrichment),
    );

    let server = ProgressServer::new(config, progress, generator);
    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
