//! Trend summaries for the long timeframes.
//!
//! `GET /summaries/{timeframe}` answers with a small envelope whose
//! `summary` field is itself a JSON document produced by the backend's
//! summarizer:
//!
//! ```text
//! { "timeframe": "30d", "article_count": 57, "generated_at": "...",
//!   "summary": "{\"trends\": [{\"name\": ..., \"summary\": ..., \"article_ids\": [1, 2]}]}" }
//! ```
//!
//! The envelope decodes into [`SummaryResponse`]; the embedded document is
//! parsed lazily by [`TrendSummary::from_response`].

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use super::article::null_as_default;
use super::ArticleId;
use crate::error::SummaryError;

/// Wire envelope of the summaries endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub timeframe: Option<String>,
    /// Raw embedded JSON, if a summary has been generated.
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub article_count: Option<u64>,
    #[serde(default)]
    pub generated_at: Option<String>,
    /// The backend sends a message string here; a boolean also counts.
    #[serde(default)]
    pub error: Option<Value>,
}

impl SummaryResponse {
    /// Whether the backend flagged this response as an error.
    pub fn is_error(&self) -> bool {
        match &self.error {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// A named cluster of articles sharing a theme.
///
/// The document comes from a language model, so every field is optional and
/// ids are taken loosely: integers and numeric strings count, anything else
/// is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trend {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "deserialize_article_ids")]
    pub article_ids: HashSet<ArticleId>,
}

fn deserialize_article_ids<'de, D>(deserializer: D) -> Result<HashSet<ArticleId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let id = match &value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            if id.is_none() {
                debug!(%value, "ignoring unusable trend article id");
            }
            id
        })
        .collect())
}

impl Trend {
    pub fn contains(&self, id: ArticleId) -> bool {
        self.article_ids.contains(&id)
    }
}

/// The decoded embedded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParsedTrend {
    #[serde(default)]
    pub trends: Vec<Trend>,
}

/// A successfully parsed trend summary, kept together with its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub response: SummaryResponse,
    pub parsed: ParsedTrend,
}

impl TrendSummary {
    /// Validate the envelope and parse the embedded trend document.
    pub fn from_response(response: SummaryResponse) -> Result<Self, SummaryError> {
        if response.is_error() {
            return Err(SummaryError::Unavailable);
        }
        let raw = match response.summary.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Err(SummaryError::Unavailable),
        };
        let parsed: ParsedTrend = serde_json::from_str(raw)?;
        Ok(Self { response, parsed })
    }

    pub fn trends(&self) -> &[Trend] {
        &self.parsed.trends
    }
}
