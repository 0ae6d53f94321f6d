//! HTTP implementation of [`NewsApi`] on top of `reqwest`.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use super::{Article, NewsApi, SummaryResponse, Timeframe};
use crate::error::FetchError;

/// Talks to the news backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    /// Create a client for the backend rooted at `base`
    /// (e.g. `http://localhost:8000`).
    ///
    /// `timeout` bounds each request end to end; there are no retries, so a
    /// timed-out request just yields no data.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base = base.into().trim_end_matches('/').to_string();
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn articles_url(&self, timeframe: Timeframe) -> String {
        format!("{}/articles/{}", self.base, timeframe.as_str())
    }

    fn summary_url(&self, timeframe: Timeframe) -> String {
        format!("{}/summaries/{}", self.base, timeframe.as_str())
    }
}

/// Turn a non-success status into [`FetchError::Status`].
fn check_status(resp: Response) -> Result<Response, FetchError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(FetchError::Status {
            url: resp.url().to_string(),
            status,
        })
    }
}

impl NewsApi for HttpApi {
    async fn fetch_articles(
        &self,
        timeframe: Timeframe,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Article>, FetchError> {
        let url = self.articles_url(timeframe);
        debug!(%url, page, limit, "requesting articles");
        let resp = self
            .client
            .get(&url)
            .query(&[("page", page as usize), ("limit", limit)])
            .send()
            .await?;
        Ok(check_status(resp)?.json().await?)
    }

    async fn fetch_summary(&self, timeframe: Timeframe) -> Result<SummaryResponse, FetchError> {
        let url = self.summary_url(timeframe);
        debug!(%url, "requesting trend summary");
        let resp = self.client.get(&url).send().await?;
        Ok(check_status(resp)?.json().await?)
    }
}
