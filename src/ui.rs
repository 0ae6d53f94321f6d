//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Everything shown is read from
//! [`crate::controller::FeedController::view`]; nothing here mutates the
//! feed.
//!
//! ## For contributors
//!
//! * The layout is a vertical stack: timeframe tabs, trend chips (only when
//!   the timeframe has a parsed trend summary), the article list, and a
//!   one-line status bar.
//! * Rows filtered out by the selected trend are dimmed, not removed.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::controller::{ArticleView, FeedView, Phase};
use crate::source::{Timeframe, PAGE_SIZE};

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.  Delegates to helper functions
/// for each screen region.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let App {
        feed,
        list_state,
        status,
        ..
    } = app;
    let view = feed.view();

    let trends_height = if view.trends.is_empty() { 0 } else { 4 };
    let [tabs_area, trends_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(trends_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(&view, frame, tabs_area);
    if !view.trends.is_empty() {
        draw_trends(&view, frame, trends_area);
    }

    if view.articles.is_empty() {
        draw_empty(&view, frame, list_area);
    } else {
        let selected = list_state.selected().and_then(|i| view.articles.get(i));
        let list = article_list(&view, selected.map(|row| row.article.url.as_str()));
        frame.render_stateful_widget(list, list_area, list_state);
    }

    draw_status_bar(&view, status, frame, status_area);
}

/// Render the timeframe selector.
fn draw_tabs(view: &FeedView, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tf) in Timeframe::ALL.iter().enumerate() {
        let style = if *tf == view.timeframe {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{} {}", i + 1, tf.label()), style));
        spans.push(Span::raw("   "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the "All Trends" chip, one chip per trend, and the selected
/// trend's summary.
fn draw_trends(view: &FeedView, frame: &mut Frame, area: Rect) {
    let chip = |label: String, active: bool| {
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {label} "), style)
    };

    let mut chips = vec![chip(
        format!("All Trends ({} articles)", view.articles.len()),
        view.selected_trend.is_none(),
    )];
    for (i, trend) in view.trends.iter().enumerate() {
        chips.push(Span::raw(" "));
        let name = if trend.name.trim().is_empty() {
            format!("Trend {}", i + 1)
        } else {
            trend.name.clone()
        };
        chips.push(chip(name, view.selected_trend == Some(i)));
    }

    let detail = match view.selected_trend.and_then(|i| view.trends.get(i)) {
        Some(trend) => Line::styled(trend.summary.clone(), Style::default().fg(Color::Gray)),
        None => Line::styled(
            "Filter by major themes (t / T / a)",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let title = match view.analysed {
        Some(n) => format!(" Trend Analysis · {n} articles analysed "),
        None => " Trend Analysis ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::TOP | Borders::BOTTOM);
    let widget = Paragraph::new(vec![Line::from(chips), detail])
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn article_item<'a>(row: &ArticleView<'a>) -> ListItem<'a> {
    let article = row.article;
    let date_str = article
        .published
        .map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| "no date".into());

    let (meta, title, summary) = if row.dimmed {
        let dim = Style::default().fg(Color::DarkGray);
        (dim, dim, dim)
    } else {
        (
            Style::default().fg(Color::Cyan),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Gray),
        )
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(format!("{:<13}", date_str), meta),
            Span::styled(source_tag(&article.source, article.kind.as_deref()), meta),
            Span::styled(article.title.as_str(), title),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(article.summary_or_placeholder(), summary),
        ]),
    ])
}

/// `[SOURCE · kind] `, leaving out whichever part the backend did not send.
fn source_tag(source: &str, kind: Option<&str>) -> String {
    let source = source.trim().to_uppercase();
    match kind.filter(|k| !k.is_empty()) {
        Some(kind) if !source.is_empty() => format!("[{source} · {kind}] "),
        Some(kind) => format!("[{kind}] "),
        None if !source.is_empty() => format!("[{source}] "),
        None => String::new(),
    }
}

/// Build the scrollable article list, plus the trailing sentinel row.
///
/// `link` (the selected article's URL) is shown on the bottom border.
fn article_list<'a>(view: &FeedView<'a>, link: Option<&'a str>) -> List<'a> {
    let mut items: Vec<ListItem> = view.articles.iter().map(article_item).collect();

    let sentinel = if view.has_more {
        Some(if view.phase == Phase::LoadingMore {
            "Loading more…"
        } else {
            "More below, keep scrolling"
        })
    } else if view.articles.len() > PAGE_SIZE {
        Some("End of Stream")
    } else {
        None
    };
    if let Some(text) = sentinel {
        items.push(ListItem::new(Line::styled(
            format!("  {text}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let mut block = Block::default()
        .title(format!(" Latest Articles · {} ", view.timeframe.label()))
        .borders(Borders::ALL);
    if let Some(link) = link.filter(|l| !l.is_empty()) {
        block = block.title_bottom(Line::styled(
            format!(" {link} "),
            Style::default().fg(Color::Blue),
        ));
    }

    List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ")
}

/// Placeholder shown while the first page loads or when there is nothing.
fn draw_empty(view: &FeedView, frame: &mut Frame, area: Rect) {
    let lines = match view.phase {
        Phase::Idle | Phase::Loading => vec![Line::styled(
            "Loading…",
            Style::default().fg(Color::Yellow),
        )],
        _ => vec![
            Line::styled(
                "No news found for this specific timeframe.",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
            Line::styled(
                "Try checking \"7 Days\" or \"30 Days\".",
                Style::default().fg(Color::DarkGray),
            ),
        ],
    };
    let block = Block::default()
        .title(format!(" Latest Articles · {} ", view.timeframe.label()))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the bottom status bar.
fn draw_status_bar(view: &FeedView, status: &str, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} articles · page {}", view.articles.len(), view.page),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  1-4: timeframe  t/a: trends  r: refresh"),
    ]));
    frame.render_widget(status, area);
}
