// src/crawl/mod.rs
//
// Pagination controller. One cooperative flow: fetch a page, locate the
// table, extract, filter, sink, render, then either advance the offset
// cursor or stop the dimension. The advance/stop decision is a pure
// function so termination semantics are testable without any I/O.
//
// Dimensions (e.g. positions/roles) iterate in an outer loop; each restarts
// the cursor and is separated by the longer dimension delay. No request
// starts before the previous page is fully processed.

pub mod pace;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::fetch::PageFetcher;
use crate::filter::CompiledFilter;
use crate::render::Render;
use crate::schema::{self, ColumnSchema};
use crate::sink::ResultSink;
use crate::table::{extract_rows, locate};

/// Controller states; `Stopped` is per dimension, the final render happens
/// once every dimension has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FetchingPage,
    ExtractingPage,
    Filtering,
    Rendering,
    AdvancingCursor,
    Stopped,
}

/// What one fetched page amounted to, as far as the controller cares.
#[derive(Debug, Clone, Copy)]
pub enum PageOutcome {
    /// Transport error or non-success status.
    FetchFailed { status: Option<u16> },
    /// No matching table and no records: end-of-data, or on the first page a
    /// likely schema mismatch.
    Empty,
    /// A table matched; `per_page` is the raw body row count, malformed rows
    /// included, so spacer markup never ends a dimension early.
    Rows { per_page: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FetchFailed,
    NothingLocated,
    /// Row count fell short of the page-size guess: last page.
    ShortPage,
    PageCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advance { next_start: u64 },
    Stop(StopReason),
}

/// Pure advance/stop decision for one processed page.
///
/// The page-size guess is the first observed row count of the dimension. A
/// last full page that exactly equals the guess is indistinguishable from a
/// non-final page here; the crawl then terminates one fetch later via the
/// empty-page rule.
pub fn decide(
    outcome: &PageOutcome,
    start: u64,
    page_index: u32,
    size_guess: Option<usize>,
    max_pages: u32,
) -> Step {
    match *outcome {
        PageOutcome::FetchFailed { .. } => Step::Stop(StopReason::FetchFailed),
        PageOutcome::Empty => Step::Stop(StopReason::NothingLocated),
        PageOutcome::Rows { per_page } => {
            let guess = size_guess.unwrap_or(per_page);
            if per_page == 0 || per_page < guess {
                Step::Stop(StopReason::ShortPage)
            } else if page_index + 1 >= max_pages {
                Step::Stop(StopReason::PageCeiling)
            } else {
                Step::Advance { next_start: start + per_page as u64 }
            }
        }
    }
}

/// Drives a whole crawl: dimensions outside, offset cursor inside, one
/// sink/renderer pair mutated only by this flow.
pub struct Crawler<F, R> {
    config: CrawlConfig,
    schema: ColumnSchema,
    filter: CompiledFilter,
    base: Url,
    fetcher: F,
    renderer: R,
    sink: ResultSink,
    phase: Phase,
}

impl<F: PageFetcher, R: Render> Crawler<F, R> {
    pub fn new(config: CrawlConfig, fetcher: F, renderer: R) -> Result<Self> {
        let schema = schema::by_name(&config.schema)
            .with_context(|| format!("unknown schema {:?}", config.schema))?;
        let filter = CompiledFilter::compile(&config.filters, &schema)?;
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("parsing base URL {:?}", config.base_url))?;
        Ok(Self {
            config,
            schema,
            filter,
            base,
            fetcher,
            renderer,
            sink: ResultSink::new(),
            phase: Phase::Idle,
        })
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Run every dimension to its stop condition, then freeze and render the
    /// final snapshot. Partial results survive any per-dimension failure.
    pub async fn run(mut self) -> Result<ResultSink> {
        let dimensions: Vec<Option<String>> = if self.config.dimensions.is_empty() {
            vec![None]
        } else {
            self.config.dimensions.iter().cloned().map(Some).collect()
        };

        for dimension in &dimensions {
            tokio::time::sleep(pace::jittered(
                self.config.dimension_delay_ms,
                self.config.jitter_ms,
            ))
            .await;
            self.crawl_dimension(dimension.as_deref()).await?;
        }

        self.sink.finish();
        self.set_phase(Phase::Rendering);
        self.renderer.render(&self.sink.snapshot());
        self.set_phase(Phase::Stopped);
        info!(
            matches = self.sink.len(),
            scanned = self.sink.snapshot().scanned,
            "crawl done"
        );
        Ok(self.sink)
    }

    async fn crawl_dimension(&mut self, dimension: Option<&str>) -> Result<()> {
        let mut start = self.config.start;
        let mut size_guess: Option<usize> = None;

        for page_index in 0..self.config.max_pages {
            self.set_phase(Phase::FetchingPage);
            let url = self.page_url(dimension, start)?;
            trace!(%url, page_index, "fetching");

            let fetched = self.fetcher.fetch(&url).await;
            let outcome = match fetched {
                Err(err) => {
                    warn!(%url, %err, "page fetch failed");
                    PageOutcome::FetchFailed { status: None }
                }
                Ok(page) if !page.is_success() => {
                    warn!(%url, status = page.status, "non-success page status");
                    PageOutcome::FetchFailed { status: Some(page.status) }
                }
                Ok(page) => self.process_page(&page.body, &url, page_index),
            };

            if let PageOutcome::Rows { per_page } = outcome {
                self.set_phase(Phase::Rendering);
                self.renderer.render(&self.sink.snapshot());
                if size_guess.is_none() && per_page > 0 {
                    size_guess = Some(per_page);
                }
            }

            match decide(&outcome, start, page_index, size_guess, self.config.max_pages) {
                Step::Advance { next_start } => {
                    self.set_phase(Phase::AdvancingCursor);
                    start = next_start;
                    tokio::time::sleep(pace::jittered(
                        self.config.page_delay_ms,
                        self.config.jitter_ms,
                    ))
                    .await;
                }
                Step::Stop(reason) => {
                    self.set_phase(Phase::Stopped);
                    if reason == StopReason::NothingLocated && page_index == 0 {
                        warn!(
                            ?dimension,
                            schema = self.schema.name,
                            "no matching table on the first page; schema/config mismatch?"
                        );
                    } else {
                        info!(?dimension, ?reason, page_index, "dimension stopped");
                    }
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Parse, locate, extract and filter one page body. Synchronous on
    /// purpose: the parsed document never lives across a suspension point.
    fn process_page(&mut self, body: &str, url: &Url, page_index: u32) -> PageOutcome {
        self.set_phase(Phase::ExtractingPage);
        let doc = Html::parse_document(body);
        let Some(hit) = locate(&doc, &self.schema) else {
            return PageOutcome::Empty;
        };

        let page = extract_rows(&hit, &self.schema, Some(url));
        if page.per_page == 0 && page.records.is_empty() {
            return PageOutcome::Empty;
        }

        self.sink.note_page(page.per_page);
        if page.records.len() < page.per_page {
            debug!(
                rows = page.per_page,
                usable = page.records.len(),
                "page has rows without cells"
            );
        }

        self.set_phase(Phase::Filtering);
        for record in page.records {
            if self.config.debug_rows && page_index == 0 {
                debug!(name = %record.name, link = %record.link, values = ?record.values, "row");
            }
            if self.filter.passes(&record) {
                self.sink.add(record);
            }
        }

        PageOutcome::Rows { per_page: page.per_page }
    }

    fn page_url(&self, dimension: Option<&str>, start: u64) -> Result<Url> {
        let mut url = self
            .base
            .join(&self.config.list_path)
            .with_context(|| format!("joining list path {:?}", self.config.list_path))?;
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in &self.config.extra_params {
                query.append_pair(k, v);
            }
            if let Some(d) = dimension {
                query.append_pair(&self.config.dimension_param, d);
            }
            if let Some(sort) = &self.config.sort {
                query.append_pair("sort", sort);
            }
            query.append_pair(&self.config.start_param, &start.to_string());
        }
        Ok(url)
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            trace!(from = ?self.phase, to = ?phase, "phase");
            self.phase = phase;
        }
    }
}
