//! Bulletin text parser.
//!
//! Some publishers only release incident data as a periodically published
//! document; an external text-extraction step hands back the raw text.
//! The text is loosely columnar (fields padded with runs of spaces) and
//! the layout is not owned by this system, so parsing is a best-effort
//! heuristic: every line is evaluated independently and a malformed line
//! is skipped, never failing the batch.
//!
//! The per-line strategy is pluggable so a future layout change only
//! requires swapping the strategy, not the surrounding pipeline.

use crime_track_models::{CrimeIncident, IncidentSource, UNKNOWN_CRIME, UNKNOWN_LOCATION};
use regex::Regex;

use crate::parsing::{normalize_bulletin_date, normalize_bulletin_time, split_reported_at};

/// Header/footer markers. A line containing any of these
/// (case-insensitive) is page furniture, not an incident row.
const HEADER_MARKERS: &[&str] = &[
    "daily crime log",
    "department of public safety",
    "date reported",
    "syracuse university",
];

/// How to turn one line of bulletin text into an incident record.
#[derive(Debug)]
pub enum LineStrategy {
    /// Split on runs of ≥2 whitespace characters and read fields from
    /// fixed column indices. This matches the current upstream layout:
    /// offense, status, reported date-time, location.
    WhitespaceColumns {
        /// Minimum number of columns a line must produce.
        min_columns: usize,
        /// Column index of the offense classification.
        offense_column: usize,
        /// Column index of the combined reported date-time field.
        reported_at_column: usize,
        /// Column index of the location description.
        location_column: usize,
    },

    /// Match each line against a regex with `date`, `time`, `location`
    /// and `offense` named capture groups.
    RegexRows {
        /// Compiled row pattern.
        pattern: Regex,
    },
}

/// Line-by-line bulletin parser with a pluggable extraction strategy.
#[derive(Debug)]
pub struct BulletinParser {
    strategy: LineStrategy,
    column_split: Regex,
}

impl Default for BulletinParser {
    fn default() -> Self {
        Self::new(LineStrategy::WhitespaceColumns {
            min_columns: 4,
            offense_column: 0,
            reported_at_column: 2,
            location_column: 3,
        })
    }
}

impl BulletinParser {
    /// Creates a parser with the given line strategy.
    ///
    /// # Panics
    ///
    /// Never panics; the internal column-split pattern is a literal.
    #[must_use]
    pub fn new(strategy: LineStrategy) -> Self {
        Self {
            strategy,
            column_split: Regex::new(r"\s{2,}").unwrap_or_else(|_| unreachable!()),
        }
    }

    /// Creates a parser using a regex row pattern with `date`, `time`,
    /// `location` and `offense` named capture groups.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern fails to compile.
    pub fn regex_rows(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(LineStrategy::RegexRows {
            pattern: Regex::new(pattern)?,
        }))
    }

    /// Parses extracted bulletin text into canonical incidents.
    ///
    /// Infallible by design: lines that are blank, match a header marker,
    /// or do not satisfy the strategy are skipped and the batch continues.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<CrimeIncident> {
        let mut incidents = Vec::new();
        let mut skipped: usize = 0;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || is_header_line(line) {
                continue;
            }

            match self.parse_line(line) {
                Some(incident) => incidents.push(incident),
                None => {
                    skipped += 1;
                    log::debug!("bulletin: skipping unparseable line: {line:?}");
                }
            }
        }

        log::info!(
            "bulletin: parsed {} incidents ({skipped} lines skipped)",
            incidents.len(),
        );

        incidents
    }

    /// Applies the strategy to a single non-header line.
    fn parse_line(&self, line: &str) -> Option<CrimeIncident> {
        match &self.strategy {
            LineStrategy::WhitespaceColumns {
                min_columns,
                offense_column,
                reported_at_column,
                location_column,
            } => {
                let columns: Vec<&str> = self.column_split.split(line).collect();
                if columns.len() < *min_columns {
                    return None;
                }

                let offense = columns.get(*offense_column).copied().unwrap_or("");
                let reported_at = columns.get(*reported_at_column).copied().unwrap_or("");
                let location = columns.get(*location_column).copied().unwrap_or("");

                let (raw_date, raw_time) = split_reported_at(reported_at);
                Some(build_incident(offense, location, raw_date, raw_time))
            }
            LineStrategy::RegexRows { pattern } => {
                let caps = pattern.captures(line)?;
                let group = |name: &str| {
                    caps.name(name)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default()
                };
                Some(build_incident(
                    &group("offense"),
                    &group("location"),
                    group("date"),
                    group("time"),
                ))
            }
        }
    }
}

/// Returns `true` when a line is a known header/footer marker.
fn is_header_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Assembles a bulletin incident, substituting placeholders for empty
/// fields. Bulletin incidents never carry coordinates.
fn build_incident(
    offense: &str,
    location: &str,
    raw_date: String,
    raw_time: String,
) -> CrimeIncident {
    let offense_type = if offense.is_empty() {
        UNKNOWN_CRIME.to_string()
    } else {
        offense.to_string()
    };
    let location = if location.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        location.to_string()
    };

    let display_date = normalize_bulletin_date(&raw_date);
    let display_time = normalize_bulletin_time(&raw_time);

    CrimeIncident {
        offense_type,
        location,
        display_date,
        display_time,
        raw_date,
        raw_time,
        coordinates: None,
        source: IncidentSource::Bulletin,
    }
}
