//! RFC 5424 grammar: `<PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID SD [MSG]`.
//!
//! Any error here -- PRI/VERSION not recognizable, or a later field failing
//! -- is treated by [`crate::parser::parse`] as a signal to retry the whole
//! frame as RFC 3164; see that module for the fallback wiring.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::ParseErrorKind;
use crate::parser::timestamp::{build_utc, fraction_to_micros};
use crate::parser::{pri, structured_data};
use crate::record::{Record, Rfc};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})T(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})(?:\.(?P<frac>\d+))?(?P<offset>Z|[+-]\d{2}:\d{2})$",
    )
    .expect("static regex is valid")
});

pub fn parse(input: &str) -> Result<Record, ParseErrorKind> {
    let (facility, severity, rest) = pri::parse(input)?;

    let mut parts = rest.splitn(2, ' ');
    let version_token = parts.next().unwrap_or("");
    if version_token != "1" {
        return Err(ParseErrorKind::VersionInvalid(version_token.to_owned()));
    }
    let rest = parts.next().ok_or(ParseErrorKind::TimestampInvalid)?;

    let mut parts = rest.splitn(2, ' ');
    let ts_token = parts.next().unwrap_or("");
    let rest = parts.next().ok_or(ParseErrorKind::TimestampInvalid)?;
    let timestamp = parse_timestamp(ts_token)?;

    let (hostname, rest) = bounded_field(rest, 255, "hostname")?;
    let (app_name, rest) = bounded_field(rest, 48, "app_name")?;
    let (process_id, rest) = bounded_field(rest, 128, "process_id")?;
    let (message_id, rest) = bounded_field(rest, 32, "message_id")?;

    let (structured_data, rest) = structured_data::parse(rest)?;

    let message = rest.strip_prefix(' ').unwrap_or(rest);
    let message = strip_bom(message);

    let mut record = Record::new(Rfc::Rfc5424).with_pri(facility, severity);
    record.version = Some(1);
    record.timestamp = timestamp;
    record.hostname = hostname;
    record.app_name = app_name;
    record.process_id = process_id;
    record.message_id = message_id;
    record.structured_data = structured_data;
    record.message = message.to_owned();
    Ok(record)
}

fn parse_timestamp(token: &str) -> Result<Option<DateTime<Utc>>, ParseErrorKind> {
    if token == "-" {
        return Ok(None);
    }
    let caps = TIMESTAMP_RE
        .captures(token)
        .ok_or(ParseErrorKind::TimestampInvalid)?;

    let frac = caps.name("frac").map(|m| m.as_str()).unwrap_or("");
    if frac.len() > 6 {
        return Err(ParseErrorKind::TimestampInvalid);
    }

    let year: i32 = caps["year"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let month: u32 = caps["month"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let day: u32 = caps["day"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let hour: u32 = caps["hour"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let minute: u32 = caps["minute"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let second: u32 = caps["second"].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
    let micros = fraction_to_micros(frac);

    let offset_token = &caps["offset"];
    let offset_seconds = if offset_token == "Z" {
        0
    } else {
        let sign = if offset_token.starts_with('-') { -1 } else { 1 };
        let hh: i32 = offset_token[1..3].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
        let mm: i32 = offset_token[4..6].parse().map_err(|_| ParseErrorKind::TimestampInvalid)?;
        sign * (hh * 3600 + mm * 60)
    };

    build_utc(year, month, day, hour, minute, second, micros, offset_seconds)
        .map(Some)
        .ok_or(ParseErrorKind::TimestampInvalid)
}

fn bounded_field<'a>(s: &'a str, limit: usize, name: &'static str) -> Result<(Option<String>, &'a str), ParseErrorKind> {
    let mut parts = s.splitn(2, ' ');
    let token = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("");
    if token.len() > limit {
        return Err(ParseErrorKind::FieldTooLong(name));
    }
    let value = if token == "-" { None } else { Some(token.to_owned()) };
    Ok((value, rest))
}

/// Strips a leading UTF-8 BOM, or the literal ASCII text `BOM` as some
/// senders encode it.
fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').or_else(|| s.strip_prefix("BOM")).unwrap_or(s)
}
