//! Backend access layer.
//!
//! This module defines the [`NewsApi`] trait and the types the backend
//! speaks: [`Article`], [`Timeframe`] and the trend summary envelope.  The
//! HTTP implementation lives in [`http`].
//!
//! ## For contributors
//!
//! The controller never talks to the network itself.  It hands out
//! `FetchTicket`s; [`crate::fetch`] runs them against whatever [`NewsApi`]
//! it was given.  Tests plug in an in-memory implementation, so anything
//! that can answer the two calls below can drive the whole application.

mod article;
mod http;
mod timeframe;
mod trend;

// Re-export the public API of this module so callers can write
// `use crate::source::{Article, NewsApi, Timeframe};`
pub use article::{Article, ArticleId};
pub use http::HttpApi;
pub use timeframe::Timeframe;
pub use trend::{SummaryResponse, Trend, TrendSummary};

use std::future::Future;

use crate::error::FetchError;

/// Number of articles the backend is asked for per page.
///
/// A batch shorter than this is the only end-of-stream signal.
pub const PAGE_SIZE: usize = 20;

/// The two read-only calls the backend exposes.
///
/// Fetches run on spawned tokio tasks, so implementations and the futures
/// they return must be [`Send`].
pub trait NewsApi: Send + Sync + 'static {
    /// `GET /articles/{timeframe}?page={page}&limit={limit}`.
    fn fetch_articles(
        &self,
        timeframe: Timeframe,
        page: u32,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Article>, FetchError>> + Send;

    /// `GET /summaries/{timeframe}`.
    fn fetch_summary(
        &self,
        timeframe: Timeframe,
    ) -> impl Future<Output = Result<SummaryResponse, FetchError>> + Send;
}
