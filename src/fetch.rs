// src/fetch.rs
//
// Page source collaborator. The engine only ever needs a status and the raw
// markup text; transport errors and non-success statuses both end the
// current dimension upstream, never the process.

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;

/// Raw outcome of one page request.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One page request at a time; the crawl never issues these in parallel.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> impl std::future::Future<Output = Result<FetchedPage>> + Send;
}

/// Real fetcher over reqwest. The cookie store carries the ambient session;
/// the crate does no authentication of its own.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// Submit a form body (the entry-application flow).
    pub async fn post_form(&self, url: &Url, fields: &[(String, String)]) -> Result<FetchedPage> {
        let resp = self
            .client
            .post(url.clone())
            .form(fields)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok(FetchedPage { status, body })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok(FetchedPage { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses() {
        for (status, ok) in [(200, true), (204, true), (301, false), (404, false), (500, false)] {
            let page = FetchedPage { status, body: String::new() };
            assert_eq!(page.is_success(), ok, "status {status}");
        }
    }
}
