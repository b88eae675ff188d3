//! RFC 3164 timestamp dialects.
//!
//! Tried in priority order; the first recognizer that matches wins. See
//! `SPEC_FULL.md` §4.1 for the four dialects and the rationale for trying
//! them in this order (the explicit-year and Cisco dialects must be tried
//! before the bare `Mon DD HH:MM:SS` dialect, or they'd never be reached).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::clock::Clock;
use crate::error::ParseErrorKind;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Timezone-abbreviation -> UTC offset (seconds, east positive).
///
/// Deliberately small. `BST` maps to Europe/London (+1h), `CST` and `CET`
/// both map to Europe/Brussels (+2h) -- yes, `CST` here is *not* US Central
/// time. This mirrors the source behavior; see DESIGN.md.
#[derive(Debug, Clone)]
pub struct TimezoneTable {
    offsets: HashMap<String, i32>,
}

impl Default for TimezoneTable {
    fn default() -> Self {
        let mut offsets = HashMap::new();
        offsets.insert("BST".to_owned(), 3600);
        offsets.insert("CST".to_owned(), 7200);
        offsets.insert("CET".to_owned(), 7200);
        Self { offsets }
    }
}

impl TimezoneTable {
    /// Registers or overrides an abbreviation's UTC offset, in seconds.
    pub fn with_abbreviation(mut self, abbr: impl Into<String>, offset_seconds: i32) -> Self {
        self.offsets.insert(abbr.into(), offset_seconds);
        self
    }
}

/// Parses one RFC 3164 timestamp dialect starting at `input`, returning the
/// UTC instant and the remainder of `input` following the timestamp.
pub fn parse<'a>(
    input: &'a str,
    clock: &dyn Clock,
    tz_table: &TimezoneTable,
) -> Result<(DateTime<Utc>, &'a str), ParseErrorKind> {
    try_explicit_year(input, tz_table)
        .or_else(|| try_cisco(input, tz_table))
        .or_else(|| try_ctime_trailing_year(input, tz_table))
        .or_else(|| try_classic(input, clock, tz_table))
        .ok_or(ParseErrorKind::TimestampInvalid)
}

/// `YYYY Mon DD HH:MM:SS [TZ] ...`
fn try_explicit_year<'a>(input: &'a str, tz_table: &TimezoneTable) -> Option<(DateTime<Utc>, &'a str)> {
    let (year, rest) = parse_year(input)?;
    let rest = expect_space(rest)?;
    let (month, rest) = parse_month(rest)?;
    let rest = expect_space(rest)?;
    let (day, rest) = parse_day(rest)?;
    let rest = expect_space(rest)?;
    let ((hour, min, sec), rest) = parse_time(rest)?;
    let rest = expect_space(rest)?;
    let (offset, rest) = match parse_zone(rest, tz_table) {
        Some(pair) => pair,
        None => (0, rest),
    };
    let dt = build_utc(year, month, day, hour, min, sec, 0, offset)?;
    Some((dt, rest))
}

/// `Mon DD YYYY HH:MM:SS [AM|PM][.ms] [UTC|TZ-N|ABBR] [: ] ...` (Cisco CUCM).
fn try_cisco<'a>(input: &'a str, tz_table: &TimezoneTable) -> Option<(DateTime<Utc>, &'a str)> {
    let (month, rest) = parse_month(input)?;
    let rest = expect_space(rest)?;
    let (day, rest) = parse_day(rest)?;
    let rest = expect_space(rest)?;
    let (year, rest) = parse_year(rest)?;
    let rest = expect_space(rest)?;
    let ((hour, min, sec), rest) = parse_time(rest)?;

    let (hour, rest) = if let Some(rest) = rest.strip_prefix(" AM") {
        (if hour == 12 { 0 } else { hour }, rest)
    } else if let Some(rest) = rest.strip_prefix(" PM") {
        (if hour == 12 { 12 } else { hour + 12 }, rest)
    } else {
        return None;
    };

    let (micros, rest) = match rest.strip_prefix('.') {
        Some(rest) => {
            let (digits, rest) = take_digits(rest, 1, 6)?;
            (fraction_to_micros(digits), rest)
        }
        None => (0, rest),
    };

    let rest = expect_space(rest)?;
    let (offset, rest) = match parse_zone(rest, tz_table) {
        Some(pair) => pair,
        None => (0, rest),
    };
    let rest = rest.strip_prefix(" :").unwrap_or(rest);

    let dt = build_utc(year, month, day, hour, min, sec, micros, offset)?;
    Some((dt, rest))
}

/// `Mon DD HH:MM:SS [TZ] YYYY ...` (ctime-style, trailing year).
fn try_ctime_trailing_year<'a>(input: &'a str, tz_table: &TimezoneTable) -> Option<(DateTime<Utc>, &'a str)> {
    let (month, rest) = parse_month(input)?;
    let rest = expect_space(rest)?;
    let (day, rest) = parse_day(rest)?;
    let rest = expect_space(rest)?;
    let ((hour, min, sec), rest) = parse_time(rest)?;
    let rest = expect_space(rest)?;
    let (offset, rest) = match parse_zone(rest, tz_table) {
        Some((off, r)) => (off, expect_space(r)?),
        None => (0, rest),
    };
    let (year, rest) = parse_year(rest)?;
    let dt = build_utc(year, month, day, hour, min, sec, 0, offset)?;
    Some((dt, rest))
}

/// `Mon DD HH:MM:SS [TZ] ...` (classic, no year -- defaults to the current UTC year).
fn try_classic<'a>(input: &'a str, clock: &dyn Clock, tz_table: &TimezoneTable) -> Option<(DateTime<Utc>, &'a str)> {
    let (month, rest) = parse_month(input)?;
    let rest = expect_space(rest)?;
    let (day, rest) = parse_day(rest)?;
    let rest = expect_space(rest)?;
    let ((hour, min, sec), rest) = parse_time(rest)?;
    let rest = expect_space(rest)?;
    let (offset, rest) = match parse_zone(rest, tz_table) {
        Some(pair) => pair,
        None => (0, rest),
    };
    let dt = build_utc(clock.current_year(), month, day, hour, min, sec, 0, offset)?;
    Some((dt, rest))
}

fn parse_month(s: &str) -> Option<(u32, &str)> {
    if s.len() < 3 {
        return None;
    }
    let prefix = &s[..3];
    let idx = MONTHS.iter().position(|m| *m == prefix)?;
    Some((idx as u32 + 1, &s[3..]))
}

fn parse_day(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 || end > 2 {
        return None;
    }
    let day: u32 = s[..end].parse().ok()?;
    Some((day, &s[end..]))
}

fn parse_year(s: &str) -> Option<(i32, &str)> {
    if s.len() < 4 || !s.as_bytes()[..4].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.as_bytes().get(4).is_some_and(|b| b.is_ascii_digit()) {
        return None; // a 5th digit means this isn't a bare 4-digit year
    }
    let year: i32 = s[..4].parse().ok()?;
    Some((year, &s[4..]))
}

fn parse_time(s: &str) -> Option<((u32, u32, u32), &str)> {
    if s.len() < 8 {
        return None;
    }
    let two = |field: &str| -> Option<u32> {
        (field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit()))
            .then(|| field.parse().ok())
            .flatten()
    };
    let hour = two(&s[0..2])?;
    if &s[2..3] != ":" {
        return None;
    }
    let min = two(&s[3..5])?;
    if &s[5..6] != ":" {
        return None;
    }
    let sec = two(&s[6..8])?;
    Some(((hour, min, sec), &s[8..]))
}

/// Recognizes a zone token (`UTC`, `TZ±N`, or a table abbreviation) at the
/// start of `s`. Returns `None`, consuming nothing, if the next token isn't
/// one of these -- callers then treat it as the following field instead.
fn parse_zone<'a>(s: &'a str, table: &TimezoneTable) -> Option<(i32, &'a str)> {
    let token_end = s.find(' ').unwrap_or(s.len());
    let token = &s[..token_end];
    let rest = &s[token_end..];

    if token == "UTC" {
        return Some((0, rest));
    }
    if let Some(n) = token.strip_prefix("TZ+") {
        return n.parse::<i32>().ok().map(|h| (h * 3600, rest));
    }
    if let Some(n) = token.strip_prefix("TZ-") {
        return n.parse::<i32>().ok().map(|h| (-h * 3600, rest));
    }
    if !token.is_empty() && token.len() <= 5 && token.bytes().all(|b| b.is_ascii_uppercase()) {
        if let Some(&offset) = table.offsets.get(token) {
            return Some((offset, rest));
        }
        tracing::warn!(abbreviation = token, "unknown timezone abbreviation, assuming UTC");
        return Some((0, rest));
    }
    None
}

fn expect_space(s: &str) -> Option<&str> {
    Some(s.strip_prefix(' ')?.trim_start_matches(' '))
}

fn take_digits(s: &str, min: usize, max: usize) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end < min || end > max {
        return None;
    }
    Some((&s[..end], &s[end..]))
}

/// Right-pads up to 6 fractional digits with zeros, then parses as microseconds.
pub(crate) fn fraction_to_micros(digits: &str) -> u32 {
    let mut buf = [b'0'; 6];
    for (slot, b) in buf.iter_mut().zip(digits.bytes().take(6)) {
        *slot = b;
    }
    std::str::from_utf8(&buf).unwrap().parse().unwrap_or(0)
}

/// Builds a UTC instant from a local broken-down time plus a UTC offset
/// (seconds, east positive). Used by both the 3164 dialects and the 5424
/// `±HH:MM` offset once reduced to seconds.
pub(crate) fn build_utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
    micros: u32,
    offset_seconds: i32,
) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_micro_opt(hour, min, sec, micros)?;
    let naive_utc = naive - chrono::Duration::seconds(offset_seconds as i64);
    Some(Utc.from_utc_datetime(&naive_utc))
}
