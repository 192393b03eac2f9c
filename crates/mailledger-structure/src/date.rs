//! Envelope date parsing.
//!
//! Servers copy the `Date:` header into the envelope verbatim, so the value
//! is whatever the sending client produced. Parsing is best effort: a list of
//! RFC 5322/822 layouts plus a few non-standard ones seen in the wild is tried
//! in order, and the first that matches wins.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// How the zone is written at the end of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// Abbreviation such as `GMT` or `PST`.
    Named,
    /// Numeric offset such as `-0700`.
    Numeric,
}

/// A candidate date layout.
#[derive(Debug, Clone, Copy)]
struct Layout {
    /// Leading `Mon, ` weekday.
    weekday: bool,
    /// `chrono` format of the date and time, without weekday or zone.
    format: &'static str,
    zone: Zone,
    /// Length of the reference rendering; input is truncated to this.
    width: usize,
}

const fn layout(weekday: bool, format: &'static str, zone: Zone, width: usize) -> Layout {
    Layout {
        weekday,
        format,
        zone,
        width,
    }
}

const LONG: &str = "%d %b %Y %H:%M:%S";
const SHORT: &str = "%d %b %y %H:%M";

/// Layouts in priority order.
///
/// Single-digit and zero-padded days share a format; they differ in width,
/// which decides how much trailing text survives truncation.
const LAYOUTS: [Layout; 12] = [
    layout(true, LONG, Zone::Named, 28),    // Mon, 2 Jan 2006 15:04:05 MST
    layout(true, LONG, Zone::Numeric, 30),  // Mon, 2 Jan 2006 15:04:05 -0700
    layout(false, SHORT, Zone::Named, 18),  // 2 Jan 06 15:04 MST
    layout(false, SHORT, Zone::Numeric, 20), // 2 Jan 06 15:04 -0700
    layout(true, LONG, Zone::Named, 29),    // Mon, 02 Jan 2006 15:04:05 MST
    layout(true, LONG, Zone::Numeric, 31),  // Mon, 02 Jan 2006 15:04:05 -0700
    layout(false, SHORT, Zone::Named, 19),  // 02 Jan 06 15:04 MST
    layout(false, SHORT, Zone::Numeric, 21), // 02 Jan 06 15:04 -0700
    layout(false, LONG, Zone::Numeric, 26), // 02 Jan 2006 15:04:05 -0700
    layout(false, LONG, Zone::Numeric, 25), // 2 Jan 2006 15:04:05 -0700
    layout(false, LONG, Zone::Named, 24),   // 02 Jan 2006 15:04:05 MST
    layout(false, LONG, Zone::Named, 23),   // 2 Jan 2006 15:04:05 MST
];

/// Parses an envelope date string.
///
/// Leading and trailing whitespace is ignored. Returns `None` when no layout
/// matches.
///
/// # Example
///
/// ```
/// use mailledger_structure::parse_date;
///
/// let date = parse_date("Mon, 19 Jan 2015 01:23:42 -0800 (PST)").unwrap();
/// assert_eq!(date.to_rfc3339(), "2015-01-19T01:23:42-08:00");
///
/// assert!(parse_date("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_date(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    LAYOUTS
        .iter()
        .find_map(|candidate| parse_with(candidate, input))
}

fn parse_with(layout: &Layout, input: &str) -> Option<DateTime<FixedOffset>> {
    let s = truncate(input, layout.width);

    let s = if layout.weekday {
        strip_weekday(s)?
    } else {
        s
    };

    let (datetime, zone) = s.rsplit_once(' ')?;
    let naive = NaiveDateTime::parse_from_str(datetime, layout.format).ok()?;

    let offset = match layout.zone {
        Zone::Numeric => numeric_offset(zone)?,
        Zone::Named => named_offset(zone)?,
    };

    naive.and_local_timezone(offset).single()
}

/// Cuts `s` to at most `width` bytes, backing off to a char boundary.
fn truncate(s: &str, width: usize) -> &str {
    if s.len() <= width {
        return s;
    }
    let mut end = width;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Removes a `Mon, ` prefix. The weekday is not checked against the date.
fn strip_weekday(s: &str) -> Option<&str> {
    let (day, rest) = s.split_once(", ")?;
    (day.len() == 3 && day.bytes().all(|b| b.is_ascii_alphabetic())).then_some(rest)
}

/// Parses `+hhmm` / `-hhmm`.
fn numeric_offset(zone: &str) -> Option<FixedOffset> {
    let bytes = zone.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let hours = i32::from(bytes[1] - b'0') * 10 + i32::from(bytes[2] - b'0');
    let minutes = i32::from(bytes[3] - b'0') * 10 + i32::from(bytes[4] - b'0');
    if minutes >= 60 {
        return None;
    }
    let seconds = (hours * 60 + minutes) * 60;

    match bytes[0] {
        b'+' => FixedOffset::east_opt(seconds),
        b'-' => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

/// Resolves a zone abbreviation.
///
/// RFC 822 zones map to their offsets; any other alphabetic abbreviation of
/// three to five letters is accepted with a zero offset. Shorter ones are
/// rejected (except `UT` and `Z`) so that a zone cut short by truncation
/// does not match.
fn named_offset(zone: &str) -> Option<FixedOffset> {
    let upper = zone.to_ascii_uppercase();
    let known_short = matches!(upper.as_str(), "UT" | "Z");
    if !known_short && !(3..=5).contains(&zone.len()) {
        return None;
    }
    if !zone.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let hours = match upper.as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };

    FixedOffset::east_opt(hours * 3600)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn rfc3339(input: &str) -> String {
        parse_date(input).unwrap().to_rfc3339()
    }

    #[test]
    fn test_rfc1123_numeric() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 -0700"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon, 2 Jan 2006 15:04:05 -0700"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_rfc1123_named() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 MST"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Tue, 3 Jan 2006 15:04:05 GMT"),
            "2006-01-03T15:04:05+00:00"
        );
    }

    #[test]
    fn test_rfc822() {
        assert_eq!(rfc3339("02 Jan 06 15:04 -0700"), "2006-01-02T15:04:00-07:00");
        assert_eq!(rfc3339("2 Jan 06 15:04 EST"), "2006-01-02T15:04:00-05:00");
    }

    #[test]
    fn test_non_standard() {
        assert_eq!(
            rfc3339("08 Mar 2015 10:52:00 -0000"),
            "2015-03-08T10:52:00+00:00"
        );
        assert_eq!(
            rfc3339("8 Mar 2015 10:52:00 +0100"),
            "2015-03-08T10:52:00+01:00"
        );
        assert_eq!(rfc3339("8 Mar 2015 10:52:00 UT"), "2015-03-08T10:52:00+00:00");
    }

    #[test]
    fn test_trailing_comment() {
        assert_eq!(
            rfc3339("Mon, 19 Jan 2015 01:23:42 -0800 (PST)"),
            "2015-01-19T01:23:42-08:00"
        );
        assert_eq!(
            rfc3339("Fri, 2 Jan 2015 01:23:42 +0000 (UTC)"),
            "2015-01-02T01:23:42+00:00"
        );
    }

    #[test]
    fn test_weekday_not_checked() {
        // 2 Jan 2006 was a Monday.
        assert_eq!(
            rfc3339("Sun, 02 Jan 2006 15:04:05 +0000"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_unknown_abbreviation_is_utc() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 CET"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            rfc3339("  Mon, 02 Jan 2006 15:04:05 +0000\r\n"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_date("").is_none());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("2006-01-02T15:04:05Z").is_none());
        assert!(parse_date("Mon, 32 Jan 2006 15:04:05 +0000").is_none());
        assert!(parse_date("Mon, 02 Jan 2006 15:04:05 +0099").is_none());
    }

    #[test]
    fn test_non_ascii_does_not_panic() {
        assert!(parse_date("Mon, 02 Jan 2006 15:04:05 ñññññññññ").is_none());
        assert!(parse_date("ééééééééééééééééééééééééééééééé").is_none());
    }

    #[test]
    fn test_numeric_offset() {
        assert_eq!(
            numeric_offset("+0530"),
            FixedOffset::east_opt(5 * 3600 + 30 * 60)
        );
        assert_eq!(numeric_offset("-0800"), FixedOffset::west_opt(8 * 3600));
        assert_eq!(numeric_offset("0800"), None);
        assert_eq!(numeric_offset("-08"), None);
    }

    #[test]
    fn test_named_offset() {
        assert_eq!(named_offset("pdt"), FixedOffset::east_opt(-7 * 3600));
        assert_eq!(named_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(named_offset("-08"), None);
        assert_eq!(named_offset(""), None);
    }
}
