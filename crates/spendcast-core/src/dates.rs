//! Date normalization for heterogeneous expense dates
//!
//! Dates arrive from spreadsheets, form inputs and JSON APIs in whatever shape
//! the source produced. Parsing is an ordered chain of attempts where the
//! first format that consumes the whole string wins:
//!
//! 1. `YYYY-MM-DD`
//! 2. `YYYY-MM-DDTHH:MM:SS`, with optional fractional seconds
//! 3. The same with a trailing `Z`
//! 4. `DD/MM/YYYY`
//! 5. `MM/DD/YYYY`
//! 6. `YYYY/MM/DD`
//!
//! After that, the part before a `T` separator is tried as `YYYY-MM-DD`, and
//! finally a handful of permissive formats (RFC 3339 with offsets, RFC 2822,
//! spelled-out month names).
//!
//! Slash dates are ambiguous when both leading fields are <= 12. The chain
//! does not guess per record: `DD/MM/YYYY` is always tried first, so
//! `05/06/2024` is 5 June and `01/15/2024` falls through to `MM/DD/YYYY`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// One attempt in the parser chain
#[derive(Debug, Clone, Copy)]
enum DateFormat {
    /// Pattern with date fields only
    Date(&'static str),
    /// Pattern with date and time fields; the time is discarded
    DateTime(&'static str),
}

impl DateFormat {
    fn parse(self, s: &str) -> Option<NaiveDate> {
        match self {
            Self::Date(fmt) => NaiveDate::parse_from_str(s, fmt).ok(),
            Self::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.date()),
        }
    }
}

/// Primary formats, in priority order
const PRIMARY_FORMATS: &[DateFormat] = &[
    DateFormat::Date("%Y-%m-%d"),           // 2024-01-15
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"), // 2024-01-15T10:30:00
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"), // 2024-01-15T10:30:00.123
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%SZ"), // 2024-01-15T10:30:00Z
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S%.fZ"), // 2024-01-15T10:30:00.123Z
    DateFormat::Date("%d/%m/%Y"),           // 15/01/2024
    DateFormat::Date("%m/%d/%Y"),           // 01/15/2024
    DateFormat::Date("%Y/%m/%d"),           // 2024/01/15
];

/// Last-resort formats for loosely formatted input
const PERMISSIVE_FORMATS: &[DateFormat] = &[
    DateFormat::DateTime("%Y-%m-%d %H:%M:%S"), // 2024-01-15 10:30:00
    DateFormat::DateTime("%Y-%m-%d %H:%M"),    // 2024-01-15 10:30
    DateFormat::Date("%B %d, %Y"),             // January 15, 2024
    DateFormat::Date("%b %d, %Y"),             // Jan 15, 2024
    DateFormat::Date("%b %d %Y"),              // Jan 15 2024
    DateFormat::Date("%d %B %Y"),              // 15 January 2024
    DateFormat::Date("%d %b %Y"),              // 15 Jan 2024
    DateFormat::Date("%Y.%m.%d"),              // 2024.01.15
    DateFormat::Date("%d-%m-%Y"),              // 15-01-2024
];

/// Parse a raw date string into a calendar date
///
/// Returns None when nothing in the chain matches. Unparseable dates are a
/// soft failure: callers skip the record rather than abort.
pub fn parse(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = PRIMARY_FORMATS.iter().find_map(|fmt| fmt.parse(s)) {
        return Some(date);
    }

    // Date portion of an ISO string with an unexpected time part
    if let Some((date_part, _)) = s.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }

    parse_permissive(s)
}

fn parse_permissive(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    PERMISSIVE_FORMATS.iter().find_map(|fmt| fmt.parse(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_primary_formats() {
        assert_eq!(parse("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15T10:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15T10:30:00.123"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15T10:30:00Z"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15T10:30:00.123Z"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("15/01/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024/01/15"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse("  2024-03-02 \n"), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_slash_dates_are_ambiguous_first_format_wins() {
        // Known ambiguity: both readings are valid, DD/MM is tried first.
        // This pins the fixed order, not a claim about the right reading.
        assert_eq!(parse("05/06/2024"), Some(ymd(2024, 6, 5)));
        assert_eq!(parse("12/11/2024"), Some(ymd(2024, 11, 12)));
    }

    #[test]
    fn test_parse_iso_with_offset_falls_back() {
        assert_eq!(parse("2024-01-15T10:30:00+05:30"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15Tgarbage"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_parse_permissive_formats() {
        assert_eq!(parse("January 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("Jan 15 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("15 January 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("2024-01-15 08:00:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(
            parse("Mon, 15 Jan 2024 10:30:00 +0000"),
            Some(ymd(2024, 1, 15))
        );
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        for raw in [
            "",
            "   ",
            "yesterday",
            "2024-13-45",
            "31/31/2024",
            "2024-02-30",
            "not a date at all",
            "T",
            "12345",
        ] {
            assert_eq!(parse(raw), None, "expected None for {:?}", raw);
        }
    }

    #[test]
    fn test_parse_leap_day() {
        assert_eq!(parse("2024-02-29"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse("2023-02-29"), None);
    }
}
