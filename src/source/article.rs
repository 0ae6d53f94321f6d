//! The article record returned by the backend's paginated endpoint.
//!
//! Every entry of `GET /articles/{timeframe}` decodes into an [`Article`].
//! Articles are never modified after they arrive; the controller only
//! decides whether to keep them (de-duplication by [`Article::id`]).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Backend primary key of an article.
///
/// Trend clusters refer to articles by this id.
pub type ArticleId = i64;

/// A single pre-summarized news article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    /// Unique identifier used for de-duplication and trend membership.
    pub id: ArticleId,

    /// Publisher name, e.g. "OpenAI" or "Anthropic".  Empty when the
    /// backend has none on record (it sends `null`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,

    /// Headline.
    pub title: String,

    /// Link to the original story.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    /// One-line AI summary, absent until the backend has generated one.
    #[serde(default)]
    pub summary: Option<String>,

    /// Publication timestamp.
    ///
    /// `None` when the backend sent nothing or something unparseable; a bad
    /// date never fails the whole batch.
    #[serde(default, deserialize_with = "deserialize_published")]
    pub published: Option<DateTime<Utc>>,

    /// Kind of source the backend scraped it from (`rss`, `blog`, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Article {
    /// Summary text, or the placeholder shown while it is being generated.
    pub fn summary_or_placeholder(&self) -> &str {
        match self.summary.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => "Summary not available yet.",
        }
    }
}

/// Treat an explicit `null` like a missing key.
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_published<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse the timestamp formats the backend emits.
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DD HH:MM:SS[.f]` form SQLite
/// stores (also with a `T` separator), which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
