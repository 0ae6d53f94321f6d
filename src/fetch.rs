//! Background execution of fetch tickets.
//!
//! Every [`FetchTicket`] handed out by the controller is run on its own tokio
//! task.  The articles request and, when the ticket asks for it, the trend
//! summary request are issued concurrently; once both settle the combined
//! [`FetchOutcome`] is sent to the UI loop over an unbounded channel.
//!
//! ## For contributors
//!
//! Nothing here touches feed state.  Whether an outcome is still wanted is
//! decided by [`crate::controller::FeedController::apply`] when the UI loop
//! drains the channel, so tasks are never cancelled, only ignored.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::controller::{FetchOutcome, FetchTicket};
use crate::source::{NewsApi, PAGE_SIZE};

/// Runs tickets against a [`NewsApi`] and reports back on a channel.
pub struct Fetcher<A> {
    api: Arc<A>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl<A: NewsApi> Fetcher<A> {
    /// Create a fetcher and the receiver the main loop should drain on every
    /// tick.
    pub fn new(api: A) -> (Self, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            api: Arc::new(api),
            tx,
        };
        (fetcher, rx)
    }

    /// Spawn a task for `ticket`.  Must be called inside a tokio runtime.
    pub fn dispatch(&self, ticket: FetchTicket) {
        info!(
            timeframe = %ticket.timeframe,
            page = ticket.page,
            with_summary = ticket.with_summary,
            "dispatching fetch"
        );
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = run(api.as_ref(), ticket).await;
            // The receiver is gone once the UI has exited.
            if tx.send(outcome).is_err() {
                debug!("fetch outcome dropped, receiver closed");
            }
        });
    }
}

/// Perform the requests for one ticket.
///
/// The two requests are joined, not chained: a failure of one never
/// prevents the other from completing.
pub async fn run<A: NewsApi>(api: &A, ticket: FetchTicket) -> FetchOutcome {
    let articles = api.fetch_articles(ticket.timeframe, ticket.page, PAGE_SIZE);

    let (articles, summary) = if ticket.with_summary {
        let (articles, summary) = tokio::join!(articles, api.fetch_summary(ticket.timeframe));
        (articles, Some(summary))
    } else {
        (articles.await, None)
    };

    FetchOutcome {
        ticket,
        articles,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use crate::controller::tests::{batch, summary_with};
    use crate::controller::FeedController;
    use crate::error::FetchError;
    use crate::source::{Article, SummaryResponse, Timeframe};

    /// In-memory backend.  Pages are keyed by `(timeframe, page)`; anything
    /// missing is an empty page.
    #[derive(Default)]
    struct FakeApi {
        pages: HashMap<(Timeframe, u32), Vec<Article>>,
        summaries: HashMap<Timeframe, String>,
        fail_articles: bool,
        fail_summary: bool,
        summary_calls: AtomicUsize,
        requested: Mutex<Vec<(Timeframe, u32, usize)>>,
    }

    fn server_error(path: &str) -> FetchError {
        FetchError::Status {
            url: path.to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    impl NewsApi for FakeApi {
        async fn fetch_articles(
            &self,
            timeframe: Timeframe,
            page: u32,
            limit: usize,
        ) -> Result<Vec<Article>, FetchError> {
            self.requested
                .lock()
                .unwrap()
                .push((timeframe, page, limit));
            if self.fail_articles {
                return Err(server_error("/articles"));
            }
            Ok(self
                .pages
                .get(&(timeframe, page))
                .cloned()
                .unwrap_or_default())
        }

        async fn fetch_summary(&self, timeframe: Timeframe) -> Result<SummaryResponse, FetchError> {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_summary {
                return Err(server_error("/summaries"));
            }
            Ok(match self.summaries.get(&timeframe) {
                Some(raw) => summary_with(raw),
                None => serde_json::from_str(r#"{"error": "No summary found"}"#).unwrap(),
            })
        }
    }

    fn ticket(timeframe: Timeframe, page: u32, with_summary: bool) -> FetchTicket {
        FetchTicket {
            generation: 1,
            timeframe,
            page,
            with_summary,
        }
    }

    #[tokio::test]
    async fn run_requests_page_with_fixed_limit() {
        let mut api = FakeApi::default();
        api.pages.insert((Timeframe::Week, 3), batch(41..=45));

        let outcome = run(&api, ticket(Timeframe::Week, 3, false)).await;

        assert_eq!(outcome.articles.unwrap().len(), 5);
        assert!(outcome.summary.is_none());
        assert_eq!(api.summary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            *api.requested.lock().unwrap(),
            vec![(Timeframe::Week, 3, PAGE_SIZE)]
        );
    }

    #[tokio::test]
    async fn run_fetches_summary_when_asked() {
        let mut api = FakeApi::default();
        api.summaries.insert(Timeframe::Month, r#"{"trends": []}"#.into());

        let outcome = run(&api, ticket(Timeframe::Month, 1, true)).await;

        assert_eq!(api.summary_calls.load(Ordering::SeqCst), 1);
        let summary = outcome.summary.unwrap().unwrap();
        assert_eq!(summary.summary.as_deref(), Some(r#"{"trends": []}"#));
    }

    #[tokio::test]
    async fn failures_are_independent() {
        let mut api = FakeApi {
            fail_summary: true,
            ..Default::default()
        };
        api.pages.insert((Timeframe::Year, 1), batch(1..=3));

        let outcome = run(&api, ticket(Timeframe::Year, 1, true)).await;
        assert!(outcome.articles.is_ok());
        assert!(matches!(outcome.summary, Some(Err(_))));

        let api = FakeApi {
            fail_articles: true,
            ..Default::default()
        };
        let outcome = run(&api, ticket(Timeframe::Year, 1, true)).await;
        assert!(outcome.articles.is_err());
        assert!(matches!(outcome.summary, Some(Ok(_))));
    }

    #[tokio::test]
    async fn dispatch_delivers_outcome_for_controller() {
        let mut api = FakeApi::default();
        api.pages.insert((Timeframe::Month, 1), batch(1..=15));
        api.summaries.insert(
            Timeframe::Month,
            r#"{"trends": [{"name": "A", "summary": "a", "article_ids": [1]},
                           {"name": "B", "summary": "b", "article_ids": [2]}]}"#
                .into(),
        );
        let (fetcher, mut rx) = Fetcher::new(api);
        let mut controller = FeedController::new(Timeframe::Week);

        let t = controller.select_timeframe(Timeframe::Month).unwrap();
        fetcher.dispatch(t);
        let outcome = rx.recv().await.unwrap();

        assert!(controller.apply(outcome));
        assert_eq!(controller.state().articles.len(), 15);
        assert!(!controller.state().has_more);
        assert_eq!(controller.state().trends().len(), 2);
    }

    #[tokio::test]
    async fn late_outcome_is_discarded_after_switch() {
        let mut api = FakeApi::default();
        api.pages.insert((Timeframe::Week, 1), batch(100..=119));
        api.pages.insert((Timeframe::Year, 1), batch(1..=4));
        let (fetcher, mut rx) = Fetcher::new(api);
        let mut controller = FeedController::new(Timeframe::Day);

        let week = controller.select_timeframe(Timeframe::Week).unwrap();
        let year = controller.select_timeframe(Timeframe::Year).unwrap();
        fetcher.dispatch(week);
        fetcher.dispatch(year);

        let mut applied = 0;
        for _ in 0..2 {
            if controller.apply(rx.recv().await.unwrap()) {
                applied += 1;
            }
        }

        assert_eq!(applied, 1);
        assert_eq!(controller.state().timeframe, Timeframe::Year);
        let ids: Vec<_> = controller.state().articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
