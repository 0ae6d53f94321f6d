//! Feed state and the transitions that drive it.
//!
//! [`FeedController`] is a plain reducer: every operation mutates the single
//! [`FeedState`] synchronously and, when network work is needed, returns a
//! [`FetchTicket`] describing it.  The async side ([`crate::fetch`]) performs
//! the ticket and hands a [`FetchOutcome`] back to [`FeedController::apply`].
//!
//! ## Stale responses
//!
//! Each ticket carries a generation number that is bumped on every timeframe
//! change.  `apply` only accepts the outcome of the ticket currently in
//! flight; anything else (an old timeframe, an abandoned page) is dropped.
//! This is the only form of cancellation there is.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{FetchError, SummaryError};
use crate::source::{Article, ArticleId, SummaryResponse, Timeframe, Trend, TrendSummary, PAGE_SIZE};

/// Identifies one page fetch and the session it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub timeframe: Timeframe,
    pub page: u32,
    /// Whether the trend summary should be fetched alongside the page.
    pub with_summary: bool,
}

/// Result of running a [`FetchTicket`].
///
/// The two slots fail independently.  `summary` is `None` when the ticket
/// did not ask for it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub articles: Result<Vec<Article>, FetchError>,
    pub summary: Option<Result<SummaryResponse, FetchError>>,
}

/// Where the current timeframe session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// Page 1 in flight.
    Loading,
    /// A later page in flight.
    LoadingMore,
    /// Nothing in flight. `exhausted` once a short batch came back.
    Ready { exhausted: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub timeframe: Timeframe,
    /// Page the next (or current) fetch is for, starting at 1.
    pub page: u32,
    /// Accumulated articles in fetch order, unique by id.
    pub articles: Vec<Article>,
    pub has_more: bool,
    pub trend_summary: Option<TrendSummary>,
    /// Index into `trend_summary`'s trends.
    pub selected_trend: Option<usize>,
}

impl FeedState {
    fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            page: 1,
            articles: Vec::new(),
            has_more: true,
            trend_summary: None,
            selected_trend: None,
        }
    }

    pub fn trends(&self) -> &[Trend] {
        self.trend_summary
            .as_ref()
            .map(TrendSummary::trends)
            .unwrap_or(&[])
    }

    pub fn selected_trend(&self) -> Option<&Trend> {
        self.selected_trend.and_then(|i| self.trends().get(i))
    }
}

/// One row of the derived view.
#[derive(Debug, Clone, Copy)]
pub struct ArticleView<'a> {
    pub article: &'a Article,
    /// Filtered out by the selected trend (shown, but greyed).
    pub dimmed: bool,
}

/// Read-only projection of [`FeedState`] for the presentation layer.
#[derive(Debug, Clone)]
pub struct FeedView<'a> {
    pub timeframe: Timeframe,
    pub page: u32,
    pub phase: Phase,
    pub has_more: bool,
    pub articles: Vec<ArticleView<'a>>,
    pub trends: &'a [Trend],
    pub selected_trend: Option<usize>,
    /// How many articles the trend summary was generated from.
    pub analysed: Option<u64>,
}

pub struct FeedController {
    state: FeedState,
    seen: HashSet<ArticleId>,
    generation: u64,
    in_flight: Option<FetchTicket>,
    /// Highest page whose articles actually arrived this session.
    loaded_page: u32,
    /// Set once the first ticket is issued.
    started: bool,
}

impl FeedController {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            state: FeedState::new(timeframe),
            seen: HashSet::new(),
            generation: 0,
            in_flight: None,
            loaded_page: 0,
            started: false,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.in_flight {
            Some(t) if t.page == 1 => Phase::Loading,
            Some(_) => Phase::LoadingMore,
            None if !self.started => Phase::Idle,
            None => Phase::Ready {
                exhausted: !self.state.has_more,
            },
        }
    }

    /// Switch timeframe and start a fresh session.
    ///
    /// Always resets, even for the current timeframe, so this doubles as
    /// refresh.  Any ticket still in flight is abandoned.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Option<FetchTicket> {
        if let Some(old) = self.in_flight.take() {
            debug!(?old, "abandoning in-flight fetch");
        }
        self.generation += 1;
        self.state = FeedState::new(timeframe);
        self.seen.clear();
        self.loaded_page = 0;
        info!(%timeframe, generation = self.generation, "timeframe selected");
        self.load_page()
    }

    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.select_timeframe(self.state.timeframe)
    }

    /// Issue a ticket for the current page, unless one is already in flight
    /// or the stream has ended.
    pub fn load_page(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        if !self.state.has_more && self.state.page > 1 {
            return None;
        }

        let ticket = FetchTicket {
            generation: self.generation,
            timeframe: self.state.timeframe,
            page: self.state.page,
            with_summary: self.state.timeframe.has_trends() && self.state.page == 1,
        };
        self.in_flight = Some(ticket);
        self.started = true;
        Some(ticket)
    }

    /// Infinite-scroll trigger: advance to the next page.
    ///
    /// No-op while anything is in flight, once the stream is exhausted, or
    /// while the current page has not loaded.
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some()
            || !self.state.has_more
            || self.loaded_page < self.state.page
        {
            return None;
        }
        self.state.page += 1;
        self.load_page()
    }

    /// Select trend `index`, or clear the filter with `None`.
    ///
    /// Returns `false` (and changes nothing) for an index with no trend.
    pub fn select_trend(&mut self, index: Option<usize>) -> bool {
        match index {
            None => {
                self.state.selected_trend = None;
                true
            }
            Some(i) if i < self.state.trends().len() => {
                self.state.selected_trend = Some(i);
                true
            }
            Some(i) => {
                debug!(index = i, "ignoring selection of unknown trend");
                false
            }
        }
    }

    /// Apply the outcome of a ticket.  Returns `false` if it was stale.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if self.in_flight != Some(outcome.ticket) {
            debug!(ticket = ?outcome.ticket, current = ?self.in_flight, "discarding stale fetch outcome");
            return false;
        }
        self.in_flight = None;
        let ticket = outcome.ticket;

        match outcome.articles {
            Ok(batch) => self.merge_batch(ticket.page, batch),
            Err(e) => {
                warn!(timeframe = %ticket.timeframe, page = ticket.page, error = %e, "article fetch failed");
                // Fall back so the next scroll trigger asks for this page again.
                if ticket.page > 1 {
                    self.state.page = self.loaded_page.max(1);
                }
            }
        }

        match outcome.summary {
            Some(Ok(resp)) => match TrendSummary::from_response(resp) {
                Ok(summary) => {
                    info!(
                        timeframe = %ticket.timeframe,
                        trends = summary.trends().len(),
                        summary_timeframe = summary.response.timeframe.as_deref().unwrap_or("unknown"),
                        generated_at = summary.response.generated_at.as_deref().unwrap_or("unknown"),
                        "trend summary loaded"
                    );
                    self.state.trend_summary = Some(summary);
                }
                Err(SummaryError::Unavailable) => {
                    debug!(timeframe = %ticket.timeframe, "no trend summary available");
                }
                Err(e) => {
                    warn!(timeframe = %ticket.timeframe, error = %e, "failed to parse trend summary");
                }
            },
            Some(Err(e)) => {
                warn!(timeframe = %ticket.timeframe, error = %e, "trend summary fetch failed");
            }
            None => {}
        }

        true
    }

    fn merge_batch(&mut self, page: u32, batch: Vec<Article>) {
        let received = batch.len();
        if received < PAGE_SIZE {
            self.state.has_more = false;
        }
        if page == 1 {
            self.state.articles.clear();
            self.seen.clear();
        }
        let before = self.state.articles.len();
        for article in batch {
            if self.seen.insert(article.id) {
                self.state.articles.push(article);
            }
        }
        self.loaded_page = page;
        info!(
            page,
            received,
            added = self.state.articles.len() - before,
            has_more = self.state.has_more,
            "merged article batch"
        );
    }

    /// Whether `article` is filtered out by the selected trend.
    pub fn is_dimmed(&self, article: &Article) -> bool {
        self.state
            .selected_trend()
            .is_some_and(|trend| !trend.contains(article.id))
    }

    pub fn view(&self) -> FeedView<'_> {
        FeedView {
            timeframe: self.state.timeframe,
            page: self.state.page,
            phase: self.phase(),
            has_more: self.state.has_more,
            articles: self
                .state
                .articles
                .iter()
                .map(|article| ArticleView {
                    article,
                    dimmed: self.is_dimmed(article),
                })
                .collect(),
            trends: self.state.trends(),
            selected_trend: self.state.selected_trend,
            analysed: self
                .state
                .trend_summary
                .as_ref()
                .and_then(|s| s.response.article_count),
        }
    }
}
