// src/bin/apply_entries.rs
//
// Polls the configured tournament pages and submits the participation form
// whenever its button shows up. Runs until torn down; pacing matches the
// crawl engine's rules (short gap between paths, jittered idle interval
// between sweeps).

use std::path::Path;

use anyhow::{Context, Result};
use menescraper::{
    config::CrawlConfig,
    crawl::pace,
    entry::find_entry_form,
    fetch::{HttpFetcher, PageFetcher},
};
use regex::Regex;
use scraper::Html;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "crawl.yaml".to_string());
    let config = if Path::new(&config_path).exists() {
        CrawlConfig::load(&config_path)?
    } else {
        CrawlConfig::default()
    };
    if config.entry.paths.is_empty() {
        warn!("no entry paths configured, nothing to poll");
        return Ok(());
    }

    let base = Url::parse(&config.base_url)
        .with_context(|| format!("parsing base URL {:?}", config.base_url))?;
    let button = Regex::new(&config.entry.button_pattern)
        .with_context(|| format!("entry button pattern {:?}", config.entry.button_pattern))?;
    let fetcher = HttpFetcher::new()?;
    info!(paths = config.entry.paths.len(), "polling entry pages");

    loop {
        for path in &config.entry.paths {
            if let Err(err) = check_path(&fetcher, &base, path, &button).await {
                warn!(path = %path, %err, "entry check failed");
            }
            tokio::time::sleep(pace::jittered(config.entry.gap_ms, 0)).await;
        }
        tokio::time::sleep(pace::between(
            config.entry.min_interval_ms,
            config.entry.max_interval_ms,
        ))
        .await;
    }
}

async fn check_path(fetcher: &HttpFetcher, base: &Url, path: &str, button: &Regex) -> Result<()> {
    let url = base.join(path).with_context(|| format!("joining path {path:?}"))?;
    let page = fetcher.fetch(&url).await?;
    if !page.is_success() {
        warn!(%url, status = page.status, "entry page unavailable");
        return Ok(());
    }

    // Parse scope keeps the document off the await points below.
    let form = {
        let doc = Html::parse_document(&page.body);
        find_entry_form(&doc, button)
    };
    let Some(form) = form else {
        return Ok(()); // button not offered right now
    };

    let target = form.target(&url);
    let posted = fetcher.post_form(&target, &form.fields).await?;
    if posted.is_success() {
        info!(path = %path, "applied");
    } else {
        warn!(path = %path, status = posted.status, "apply rejected");
    }
    Ok(())
}
