// src/bin/inspect_table.rs
//
// Diagnostic: fetch one list page and report which builtin schemas can
// locate a table on it, and how their columns mapped. Useful when a crawl
// stops on its first page and the logs suggest a schema mismatch.

use anyhow::{bail, Context, Result};
use menescraper::{
    fetch::{HttpFetcher, PageFetcher},
    schema,
    table::{extract_rows, locate},
};
use scraper::Html;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let arg = std::env::args().nth(1).context("usage: inspect_table <url>")?;
    let url = Url::parse(&arg).with_context(|| format!("parsing URL {arg:?}"))?;

    let fetcher = HttpFetcher::new()?;
    let page = fetcher.fetch(&url).await?;
    if !page.is_success() {
        bail!("HTTP {} fetching {url}", page.status);
    }

    let doc = Html::parse_document(&page.body);
    for name in ["players", "staff", "teams", "tournaments"] {
        let schema = schema::by_name(name).expect("builtin schema");
        match locate(&doc, &schema) {
            None => warn!(schema = name, "no matching table"),
            Some(hit) => {
                let mapped: Vec<String> = schema
                    .fields
                    .iter()
                    .zip(&hit.map.fields)
                    .map(|(f, col)| match col {
                        Some(c) => format!("{}={c}", f.name),
                        None => format!("{}=absent", f.name),
                    })
                    .collect();
                let rows = extract_rows(&hit, &schema, Some(&url));
                info!(
                    schema = name,
                    identity = hit.map.identity,
                    columns = %mapped.join(" "),
                    rows = rows.per_page,
                    "matched"
                );
            }
        }
    }
    Ok(())
}
