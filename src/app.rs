use ratatui::widgets::ListState;

use crate::controller::{FeedController, FetchOutcome, FetchTicket, Phase};
use crate::source::Timeframe;

/// How close to the end of the list the cursor may get before the next page
/// is requested.
const LOAD_MORE_THRESHOLD: usize = 5;

pub struct App {
    pub feed: FeedController,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last fetch status message.
    pub status: String,
    /// Tickets issued since the main loop last collected them.
    requests: Vec<FetchTicket>,
}

impl App {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            feed: FeedController::new(timeframe),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            requests: Vec::new(),
        }
    }

    /// Tickets the main loop should hand to the fetcher.
    pub fn take_requests(&mut self) -> Vec<FetchTicket> {
        std::mem::take(&mut self.requests)
    }

    fn issue(&mut self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            self.status = if ticket.page == 1 {
                format!("Loading {}…", ticket.timeframe.label())
            } else {
                format!("Loading page {}…", ticket.page)
            };
            self.requests.push(ticket);
        }
    }

    // -- feed actions --------------------------------------------------------

    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        let ticket = self.feed.select_timeframe(timeframe);
        self.list_state.select(None);
        self.issue(ticket);
    }

    pub fn next_timeframe(&mut self) {
        self.select_timeframe(self.feed.state().timeframe.next());
    }

    pub fn refresh(&mut self) {
        let ticket = self.feed.refresh();
        self.list_state.select(None);
        self.issue(ticket);
    }

    pub fn load_more(&mut self) {
        let ticket = self.feed.request_next_page();
        self.issue(ticket);
    }

    /// Cycle forward through the trends; past the last one the filter is
    /// cleared ("All Trends").
    pub fn next_trend(&mut self) {
        let count = self.feed.state().trends().len();
        if count == 0 {
            return;
        }
        let next = match self.feed.state().selected_trend {
            None => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            Some(_) => None,
        };
        self.feed.select_trend(next);
    }

    pub fn previous_trend(&mut self) {
        let count = self.feed.state().trends().len();
        if count == 0 {
            return;
        }
        let prev = match self.feed.state().selected_trend {
            None => Some(count - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        self.feed.select_trend(prev);
    }

    pub fn clear_trend(&mut self) {
        self.feed.select_trend(None);
    }

    /// Feed a finished fetch back into the controller.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        let error = outcome.articles.as_ref().err().map(ToString::to_string);
        let page = outcome.ticket.page;

        if !self.feed.apply(outcome) {
            return;
        }

        let count = self.feed.state().articles.len();
        let succeeded = error.is_none();
        self.status = match error {
            Some(e) => format!("Error: {e}"),
            None if self.feed.phase() == (Phase::Ready { exhausted: true }) => {
                format!("Loaded page {page}, end of stream")
            }
            None => format!("Loaded page {page}"),
        };

        if count == 0 {
            self.list_state.select(None);
        } else if page == 1 && self.list_state.selected().is_none() {
            self.list_state.select(Some(0));
        }

        // The cursor may still be near the end, e.g. after a page of duplicates.
        if succeeded {
            self.maybe_load_more();
        }
    }

    // -- navigation ----------------------------------------------------------

    /// Ask for the next page once the cursor nears the end of the list.
    fn maybe_load_more(&mut self) {
        let len = self.feed.state().articles.len();
        if let Some(i) = self.list_state.selected() {
            if i + LOAD_MORE_THRESHOLD >= len {
                self.load_more();
            }
        }
    }

    pub fn select_next(&mut self) {
        let len = self.feed.state().articles.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.maybe_load_more();
    }

    pub fn select_previous(&mut self) {
        if self.feed.state().articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.feed.state().articles.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.feed.state().articles.len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
            self.maybe_load_more();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{batch, summary_with};
    use crate::error::FetchError;
    use reqwest::StatusCode;

    const TRENDS: &str = r#"{"trends": [
        {"name": "Agents", "summary": "a", "article_ids": [1]},
        {"name": "Chips", "summary": "b", "article_ids": [2]}
    ]}"#;

    /// App that has loaded page 1 of `timeframe` with `n` articles.
    fn loaded_app(timeframe: Timeframe, n: i64) -> App {
        let mut app = App::new(timeframe);
        app.select_timeframe(timeframe);
        let ticket = app.take_requests().remove(0);
        app.handle_outcome(FetchOutcome {
            ticket,
            articles: Ok(batch(1..=n)),
            summary: ticket.with_summary.then(|| Ok(summary_with(TRENDS))),
        });
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let mut app = App::new(Timeframe::Week);
        assert!(app.feed.state().articles.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(app.take_requests().is_empty());
    }

    // -- feed actions --------------------------------------------------------

    #[test]
    fn select_timeframe_queues_a_ticket() {
        let mut app = App::new(Timeframe::Week);
        app.select_timeframe(Timeframe::Month);

        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeframe, Timeframe::Month);
        assert!(requests[0].with_summary);
        assert!(app.take_requests().is_empty(), "requests are drained");
        assert_eq!(app.status, "Loading 30 Days…");
    }

    #[test]
    fn first_page_selects_first_row() {
        let app = loaded_app(Timeframe::Week, 20);
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.status, "Loaded page 1");
    }

    #[test]
    fn short_first_page_reports_end_of_stream() {
        let app = loaded_app(Timeframe::Week, 3);
        assert_eq!(app.status, "Loaded page 1, end of stream");
    }

    #[test]
    fn failed_fetch_shows_error() {
        let mut app = App::new(Timeframe::Week);
        app.select_timeframe(Timeframe::Week);
        let ticket = app.take_requests().remove(0);
        app.handle_outcome(FetchOutcome {
            ticket,
            articles: Err(FetchError::Status {
                url: "http://localhost:8000/articles/7d".into(),
                status: StatusCode::BAD_GATEWAY,
            }),
            summary: None,
        });

        assert!(app.status.starts_with("Error:"));
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn stale_outcome_leaves_status_alone() {
        let mut app = App::new(Timeframe::Week);
        app.select_timeframe(Timeframe::Week);
        let stale = app.take_requests().remove(0);
        app.select_timeframe(Timeframe::Day);
        app.handle_outcome(FetchOutcome {
            ticket: stale,
            articles: Ok(batch(1..=20)),
            summary: None,
        });

        assert_eq!(app.status, "Loading Today…");
        assert!(app.feed.state().articles.is_empty());
    }

    #[test]
    fn next_timeframe_cycles() {
        let mut app = App::new(Timeframe::Year);
        app.next_timeframe();
        assert_eq!(app.feed.state().timeframe, Timeframe::Day);
    }

    #[test]
    fn trend_cycling_wraps_through_all_trends() {
        let mut app = loaded_app(Timeframe::Month, 5);

        app.next_trend();
        assert_eq!(app.feed.state().selected_trend, Some(0));
        app.next_trend();
        assert_eq!(app.feed.state().selected_trend, Some(1));
        app.next_trend();
        assert_eq!(app.feed.state().selected_trend, None);

        app.previous_trend();
        assert_eq!(app.feed.state().selected_trend, Some(1));
        app.clear_trend();
        assert_eq!(app.feed.state().selected_trend, None);
    }

    #[test]
    fn trend_cycling_without_trends_is_noop() {
        let mut app = loaded_app(Timeframe::Week, 5);
        app.next_trend();
        app.previous_trend();
        assert_eq!(app.feed.state().selected_trend, None);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut app = App::new(Timeframe::Week);
        app.select_next();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = loaded_app(Timeframe::Week, 3);
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = loaded_app(Timeframe::Week, 3);
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn scrolling_near_the_end_requests_next_page_once() {
        let mut app = loaded_app(Timeframe::Week, 20);

        for _ in 0..13 {
            app.select_next();
        }
        assert!(app.take_requests().is_empty(), "still far from the end");

        app.select_next();
        app.select_next();
        app.select_next();
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page, 2);
    }

    #[test]
    fn page_of_duplicates_near_the_end_requests_the_next_one() {
        let mut app = loaded_app(Timeframe::Week, 20);
        app.select_last();
        let second = app.take_requests().remove(0);
        assert_eq!(second.page, 2);

        app.handle_outcome(FetchOutcome {
            ticket: second,
            articles: Ok(batch(1..=20)),
            summary: None,
        });

        assert_eq!(app.feed.state().articles.len(), 20);
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page, 3);
    }

    #[test]
    fn failed_next_page_is_not_retried_without_a_trigger() {
        let mut app = loaded_app(Timeframe::Week, 20);
        app.select_last();
        let second = app.take_requests().remove(0);

        app.handle_outcome(FetchOutcome {
            ticket: second,
            articles: Err(FetchError::Status {
                url: "http://localhost:8000/articles/7d".into(),
                status: StatusCode::BAD_GATEWAY,
            }),
            summary: None,
        });

        assert!(app.take_requests().is_empty());
        assert!(app.status.starts_with("Error:"));
    }

    #[test]
    fn jumping_to_end_of_exhausted_stream_requests_nothing() {
        let mut app = loaded_app(Timeframe::Week, 7);
        app.select_last();
        assert!(app.take_requests().is_empty());
    }
}
