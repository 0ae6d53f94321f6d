//! The fixed lookback windows the backend can be queried with.

use std::fmt;
use std::str::FromStr;

/// One of the four article lookback windows.
///
/// The wire form (`1d`, `7d`, `30d`, `1y`) is what appears in the backend
/// paths; [`label`](Timeframe::label) is what the tab bar shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Timeframe {
    /// Every timeframe, in tab order.
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Year,
    ];

    /// Path segment used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Day => "1d",
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
            Timeframe::Year => "1y",
        }
    }

    /// Human-readable tab label.
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Day => "Today",
            Timeframe::Week => "7 Days",
            Timeframe::Month => "30 Days",
            Timeframe::Year => "Year",
        }
    }

    /// Trend summaries are only generated for the long windows.
    pub fn has_trends(self) -> bool {
        matches!(self, Timeframe::Month | Timeframe::Year)
    }

    /// The timeframe after this one in tab order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `1d`, `7d`, `30d`, `1y`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timeframe {0:?} (expected one of 1d, 7d, 30d, 1y)")]
pub struct ParseTimeframeError(String);

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::Day);
        assert_eq!("7d".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert_eq!("30d".parse::<Timeframe>().unwrap(), Timeframe::Month);
        assert_eq!(" 1Y ".parse::<Timeframe>().unwrap(), Timeframe::Year);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "2w".parse::<Timeframe>().unwrap_err();
        assert!(err.to_string().contains("2w"));
    }

    #[test]
    fn default_is_seven_days() {
        assert_eq!(Timeframe::default(), Timeframe::Week);
    }

    #[test]
    fn only_long_windows_have_trends() {
        assert!(!Timeframe::Day.has_trends());
        assert!(!Timeframe::Week.has_trends());
        assert!(Timeframe::Month.has_trends());
        assert!(Timeframe::Year.has_trends());
    }

    #[test]
    fn next_wraps_around() {
        assert_eq!(Timeframe::Day.next(), Timeframe::Week);
        assert_eq!(Timeframe::Year.next(), Timeframe::Day);
    }

    #[test]
    fn display_matches_path_segment() {
        assert_eq!(Timeframe::Month.to_string(), "30d");
    }
}
