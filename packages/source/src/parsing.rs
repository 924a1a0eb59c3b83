//! Pure date/time normalizers shared by the ingestion paths.
//!
//! Both source grammars share one contract: never panic, never error.
//! Every function returns a displayable string, falling back to the raw
//! value on mismatch, or to the literal `"Unknown"` when the raw value is
//! itself empty.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use crime_track_models::{IncidentSource, UNKNOWN};

/// The two date/time encodings the pipeline understands.
///
/// The structured feed publishes RFC-822-like dates and bare `HHmm` clock
/// values; the bulletin already carries `MM/DD/YYYY` and `HH:MM`. Modeled
/// as a tagged dispatch so both grammars share the fallback contract
/// instead of duplicating branching at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeGrammar {
    /// `"EEE, dd MMM yyyy HH:mm:ss zzz"` dates, `HHmm` times.
    Feed,
    /// `MM/DD/YYYY` dates, `HH:MM` times (pass-through).
    Bulletin,
}

impl From<IncidentSource> for DateTimeGrammar {
    fn from(source: IncidentSource) -> Self {
        match source {
            IncidentSource::StructuredFeed => Self::Feed,
            IncidentSource::Bulletin => Self::Bulletin,
        }
    }
}

impl DateTimeGrammar {
    /// Normalizes a raw date to its display form.
    #[must_use]
    pub fn display_date(self, raw: &str) -> String {
        match self {
            Self::Feed => normalize_feed_date(raw),
            Self::Bulletin => normalize_bulletin_date(raw),
        }
    }

    /// Normalizes a raw time to its display form.
    #[must_use]
    pub fn display_time(self, raw: &str) -> String {
        match self {
            Self::Feed => normalize_feed_time(raw),
            Self::Bulletin => normalize_bulletin_time(raw),
        }
    }

    /// Parses a raw date/time pair into one comparable representation.
    ///
    /// Used when merging incidents across sources: the raw encodings do not
    /// sort lexicographically across grammars, so the merge orders by this
    /// value instead. Returns `None` when the date is unparseable.
    #[must_use]
    pub fn occurred_at(self, raw_date: &str, raw_time: &str) -> Option<NaiveDateTime> {
        match self {
            Self::Feed => {
                let date = parse_feed_date(raw_date)?;
                Some(parse_feed_time(raw_time).map_or(date, |time| {
                    NaiveDateTime::new(date.date(), time)
                }))
            }
            Self::Bulletin => {
                let date = NaiveDate::parse_from_str(raw_date, "%m/%d/%Y").ok()?;
                let time = NaiveTime::parse_from_str(raw_time, "%H:%M")
                    .unwrap_or(NaiveTime::MIN);
                Some(NaiveDateTime::new(date, time))
            }
        }
    }
}

/// Parses a feed datetime string (`"Thu, 02 Jan 2025 00:00:00 EST"`).
///
/// Tries RFC 2822 first (which covers the North American zone
/// abbreviations), then retries without the trailing zone token for zone
/// names RFC 2822 does not define.
fn parse_feed_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw.trim()) {
        return Some(dt.naive_local());
    }
    let (front, _zone) = raw.trim().rsplit_once(' ')?;
    NaiveDateTime::parse_from_str(front, "%a, %d %b %Y %H:%M:%S").ok()
}

/// Parses a 1–4 digit 24-hour clock value (`"1806"`, `"806"`) by
/// left-zero-padding to `HHmm`.
fn parse_feed_time(raw: &str) -> Option<NaiveTime> {
    if raw.is_empty() || raw.len() > 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::parse_from_str(&format!("{raw:0>4}"), "%H%M").ok()
}

/// Normalizes a feed date to `MM/dd/yyyy`. Mismatch returns the raw string
/// unchanged; an empty raw value returns `"Unknown"`.
#[must_use]
pub fn normalize_feed_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNKNOWN.to_string();
    }
    parse_feed_date(raw).map_or_else(
        || raw.to_string(),
        |dt| dt.format("%m/%d/%Y").to_string(),
    )
}

/// Normalizes a feed time to `hh:mm a` (12-hour, upper-case AM/PM).
/// Mismatch returns the raw string unchanged; an empty raw value returns
/// `"Unknown"`.
#[must_use]
pub fn normalize_feed_time(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNKNOWN.to_string();
    }
    parse_feed_time(raw).map_or_else(
        || raw.to_string(),
        |time| time.format("%I:%M %p").to_string(),
    )
}

/// Bulletin dates already read `MM/DD/YYYY`; pass through.
#[must_use]
pub fn normalize_bulletin_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        raw.to_string()
    }
}

/// Bulletin times already read `HH:MM`; pass through.
#[must_use]
pub fn normalize_bulletin_time(raw: &str) -> String {
    if raw.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        raw.to_string()
    }
}

/// Splits the bulletin's combined reported-date-time field on its single
/// space separator.
///
/// A field without the separator yields the date verbatim and the literal
/// `"Unknown"` time.
#[must_use]
pub fn split_reported_at(field: &str) -> (String, String) {
    field.split_once(' ').map_or_else(
        || (field.to_string(), UNKNOWN.to_string()),
        |(date, time)| (date.to_string(), time.to_string()),
    )
}
