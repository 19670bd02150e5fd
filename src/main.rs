// src/main.rs

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use menescraper::{
    config::CrawlConfig,
    crawl::Crawler,
    fetch::HttpFetcher,
    render::LogRenderer,
    schema,
    sink::ResultSink,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = env::args().nth(1).unwrap_or_else(|| "crawl.yaml".to_string());
    let config = if Path::new(&config_path).exists() {
        CrawlConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "no config file, running with defaults");
        CrawlConfig::default()
    };
    let schema = schema::by_name(&config.schema)
        .with_context(|| format!("unknown schema {:?}", config.schema))?;
    info!(schema = schema.name, list_path = %config.list_path, "configured");

    // ─── 3) crawl ────────────────────────────────────────────────────
    let fetcher = HttpFetcher::new()?;
    let crawler = Crawler::new(config, fetcher, LogRenderer::default())?;
    let sink = crawler.run().await?;

    // ─── 4) export ───────────────────────────────────────────────────
    let out = ResultSink::export_filename(&schema);
    fs::write(&out, sink.export_csv(&schema)).with_context(|| format!("writing {out}"))?;
    let snapshot = sink.snapshot();
    info!(
        matches = snapshot.results.len(),
        scanned = snapshot.scanned,
        file = %out,
        "export written"
    );
    Ok(())
}
