//! Fetch the first page of diary records and print a summary.
//!
//! Usage: `folio-probe [config.yaml] [--favorites]`
//!
//! Without a config file the defaults are used; `FOLIO_BASE_URL` and
//! `FOLIO_MAX_RETRIES` override either. `FOLIO_TOKEN` is sent as a bearer token.

use anyhow::{Context, Result, bail};
use folio::resources::{records_client, records_engine};
use folio::{FetchOutcome, FolioConfig, ReqwestTransport, init_logging};
use folio_client::{NoToken, StaticToken, TokenProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");

    let mut config_path: Option<PathBuf> = None;
    let mut favorites_only = false;
    for arg in std::env::args().skip(1) {
        if arg == "--favorites" || arg == "-f" {
            favorites_only = true;
        } else if !arg.starts_with('-') {
            config_path = Some(PathBuf::from(arg));
        }
    }

    let config = match &config_path {
        Some(path) => FolioConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FolioConfig::from_env().context("loading configuration from environment")?,
    };
    info!("[Probe] Using {}", config.client.base_url);

    let tokens: Arc<dyn TokenProvider> = match std::env::var("FOLIO_TOKEN") {
        Ok(token) => Arc::new(StaticToken::new(token)),
        Err(_) => Arc::new(NoToken),
    };
    let client = records_client(&config.client, Arc::new(ReqwestTransport::new()))
        .with_token_provider(tokens);
    let engine = records_engine(client, &config.engine, favorites_only);

    match engine.request_more().await {
        FetchOutcome::Failed(error) => bail!("fetching records failed: {}", error),
        outcome => info!("[Probe] {:?}", outcome),
    }

    let state = engine.snapshot();
    println!(
        "{} records loaded, phase {:?}, total {}",
        state.items.len(),
        state.phase,
        state
            .total_known
            .map(|total| total.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    for record in &state.items {
        let date = record
            .date_published
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let star = if record.is_favorite { "*" } else { " " };
        println!("{} {:<10} {}", star, date, record.title);
    }
    Ok(())
}
