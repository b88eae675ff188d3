//! Tolerant RFC 3164 grammar, including the Cisco CUCM extensions.
//!
//! Unlike [`crate::parser::rfc5424`], this path never raises: a failure at
//! or after the timestamp stage falls back to the rule from the design
//! notes -- `message` becomes the entire original frame, with whatever
//! fields were already committed (facility/severity, sometimes timestamp)
//! preserved.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::clock::Clock;
use crate::parser::timestamp::TimezoneTable;
use crate::parser::{pri, structured_data, timestamp};
use crate::record::{Record, Rfc, StructuredData};

pub fn parse(input: &str, clock: &dyn Clock, tz_table: &TimezoneTable) -> Record {
    let mut record = Record::new(Rfc::Rfc3164);

    let cursor = match pri::parse_tolerant(input) {
        Ok((facility, severity, rest)) => {
            record.facility = Some(facility);
            record.severity = Some(severity);
            rest
        }
        Err(_) => input,
    };

    let cursor = match timestamp::parse(cursor, clock, tz_table) {
        Ok((ts, rest)) => {
            record.timestamp = Some(ts);
            rest
        }
        Err(_) => {
            record.message = input.to_owned();
            return record;
        }
    };
    let cursor = cursor.trim_start_matches(' ');

    let (hostname, ip_address, cursor) = if skip_hostname(cursor) {
        (None, None, cursor)
    } else {
        match parse_hostname(cursor) {
            Some((hostname, rest)) => {
                let rest = rest.trim_start_matches(' ');
                let (ip, rest) = parse_optional_ipv4(rest);
                (Some(hostname), ip, rest)
            }
            None => {
                record.message = input.to_owned();
                return record;
            }
        }
    };
    record.hostname = hostname;
    record.ip_address = ip_address;
    let cursor = cursor.trim_start_matches(' ');

    if let Some(rest) = cursor.strip_prefix('%').filter(|r| r.starts_with('[')) {
        return match parse_cisco_structured_data(rest) {
            Some((sd, rest)) => {
                record.structured_data = sd;
                record.message = rest.trim_start_matches(' ').to_owned();
                record
            }
            None => {
                record.message = input.to_owned();
                record
            }
        };
    }

    let Some(colon_idx) = cursor.find(':') else {
        record.message = input.to_owned();
        return record;
    };
    let (app_name, process_id) = parse_app_procid(&cursor[..colon_idx]);
    record.app_name = app_name;
    record.process_id = process_id;
    let rest = cursor[colon_idx + 1..].trim_start_matches(' ');

    if rest.starts_with('[') {
        match structured_data::parse(rest) {
            Ok((sd, rest)) => {
                record.structured_data = sd;
                record.message = rest.to_owned();
            }
            Err(_) => record.message = input.to_owned(),
        }
    } else {
        record.message = rest.to_owned();
    }
    record
}

/// The hostname slot is skipped for Cisco-style messages with no hostname:
/// the remainder begins directly with the tag (`%...`), or with a bare
/// Cisco colon-tag marker (`: %...`), or with a timezone abbreviation that
/// precedes one (`ABBR : %...`).
fn skip_hostname(s: &str) -> bool {
    if s.starts_with('%') || s.starts_with(": %") {
        return true;
    }
    let token_end = s.find(' ').unwrap_or(s.len());
    let token = &s[..token_end];
    if !token.is_empty() && token.len() <= 6 && token.bytes().all(|b| b.is_ascii_uppercase()) {
        if let Some(rest) = s[token_end..].trim_start_matches(' ').strip_prefix(':') {
            return rest.trim_start_matches(' ').starts_with('%');
        }
    }
    false
}

fn parse_hostname(s: &str) -> Option<(String, &str)> {
    let end = s.find(' ').unwrap_or(s.len());
    if end == 0 || end > 255 {
        return None;
    }
    Some((s[..end].to_owned(), &s[end..]))
}

fn parse_optional_ipv4(s: &str) -> (Option<String>, &str) {
    let end = s.find(' ').unwrap_or(s.len());
    let token = &s[..end];
    if token.parse::<Ipv4Addr>().is_ok() {
        (Some(token.to_owned()), s[end..].trim_start_matches(' '))
    } else {
        (None, s)
    }
}

/// Splits a tag like `myproc[10]` into (`myproc`, `10`), or `su` into
/// (`su`, None) when there's no bracketed process id.
fn parse_app_procid(tag: &str) -> (Option<String>, Option<String>) {
    if let Some(open) = tag.find('[') {
        if let Some(stripped) = tag.strip_suffix(']') {
            let app = &stripped[..open];
            let pid = &stripped[open + 1..];
            let app = (!app.is_empty()).then(|| app.to_owned());
            let pid = (!pid.is_empty()).then(|| pid.to_owned());
            return (app, pid);
        }
    }
    ((!tag.is_empty()).then(|| tag.to_owned()), None)
}

/// RFC 5424 §6.3.1: SD-ID is a token of at most 32 bytes. The Cisco `key`
/// plays the same role here, so the same bound applies.
const MAX_SD_ID_LEN: usize = 32;

/// Parses the Cisco `%[key=value][key=value]...:` structured-data dialect.
/// `s` starts right after the leading `%`. Each bracket pair becomes an
/// SD-ID whose sole param is named `value`.
fn parse_cisco_structured_data(mut s: &str) -> Option<(StructuredData, &str)> {
    let mut data = StructuredData::new();
    let mut groups = 0usize;
    while let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']')?;
        let (key, value) = rest[..end].split_once('=')?;
        let key = key.trim();
        if key.is_empty() || key.len() > MAX_SD_ID_LEN {
            return None;
        }
        let mut params = HashMap::new();
        params.insert("value".to_owned(), value.trim().to_owned());
        data.insert(key.to_owned(), params);
        s = &rest[end + 1..];
        groups += 1;
    }
    if groups == 0 {
        return None;
    }
    let s = s.strip_prefix(':')?;
    Some((data, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn parse_with(input: &str) -> Record {
        parse(input, &FixedClock::new(2024), &TimezoneTable::default())
    }

    #[test]
    fn classic_dialect_normative_example() {
        let record = parse_with("<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8");
        assert_eq!(record.facility.unwrap().as_u8(), 4);
        assert_eq!(record.severity.unwrap().as_u8(), 2);
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "2024-10-11T22:14:15+00:00");
        assert_eq!(record.hostname.as_deref(), Some("mymachine"));
        assert_eq!(record.app_name.as_deref(), Some("su"));
        assert_eq!(record.message, "'su root' failed for lonvick on /dev/pts/8");
    }

    #[test]
    fn ctime_trailing_year_with_cst_abbreviation() {
        let record = parse_with("<165>Aug 24 05:34:00 CST 1987 mymachine myproc[10]: %% hi");
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "1987-08-24T03:34:00+00:00");
        assert_eq!(record.app_name.as_deref(), Some("myproc"));
        assert_eq!(record.process_id.as_deref(), Some("10"));
    }

    #[test]
    fn explicit_year_with_ip_address_in_hostname_slot() {
        let record =
            parse_with("<0>1990 Oct 22 10:52:01 TZ-6 scapegoat.dmz.example.org 10.1.2.3 sched[0]: That's All Folks!");
        assert_eq!(record.facility.unwrap().as_u8(), 0);
        assert_eq!(record.severity.unwrap().as_u8(), 0);
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "1990-10-22T16:52:01+00:00");
        assert_eq!(record.hostname.as_deref(), Some("scapegoat.dmz.example.org"));
        assert_eq!(record.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(record.app_name.as_deref(), Some("sched"));
        assert_eq!(record.process_id.as_deref(), Some("0"));
        assert_eq!(record.message, "That's All Folks!");
    }

    #[test]
    fn cisco_dialect_with_sequence_number_and_percent_tag() {
        let record = parse_with("<189>8103: Apr 20 2025 10:45:20 PM.601 UTC : %UC_AUDITLOG-5-AdministrativeEvent: hi");
        assert_eq!(record.facility.unwrap().as_u8(), 23);
        assert_eq!(record.severity.unwrap().as_u8(), 5);
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "2025-04-20T22:45:20.601+00:00");
        assert!(record.hostname.is_none());
        assert_eq!(record.message, "hi");
    }

    #[test]
    fn cisco_scenario_from_testable_properties() {
        let record = parse_with("<189>May 1 2019 07:10:40 PM.781 UTC : %UC_AUDITLOG-5-AdministrativeEvent: Test message");
        assert_eq!(record.facility.unwrap().as_u8(), 23);
        assert_eq!(record.severity.unwrap().as_u8(), 5);
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "2019-05-01T19:10:40.781+00:00");
        assert!(record.hostname.is_none());
        assert_eq!(record.message, "Test message");
    }

    #[test]
    fn catastrophic_timestamp_failure_preserves_pri_and_uses_entire_frame() {
        let input = "<34>Invalid timestamp format mymachine su: Test message";
        let record = parse_with(input);
        assert_eq!(record.facility.unwrap().as_u8(), 4);
        assert_eq!(record.severity.unwrap().as_u8(), 2);
        assert!(record.timestamp.is_none());
        assert_eq!(record.message, input);
    }

    #[test]
    fn message_with_no_pri_and_no_structure() {
        let record = parse_with("Use the BFG!");
        assert!(record.facility.is_none());
        assert!(record.severity.is_none());
        assert!(record.timestamp.is_none());
        assert_eq!(record.message, "Use the BFG!");
    }

    #[test]
    fn missing_tag_colon_falls_back_to_entire_frame() {
        let input = "<34>Oct 11 22:14:15 mymachine no colon here";
        let record = parse_with(input);
        assert_eq!(record.message, input);
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "2024-10-11T22:14:15+00:00");
    }

    #[test]
    fn cisco_bracketed_structured_data_dialect() {
        let record = parse_with("<34>Oct 11 22:14:15 %[level=high][code = 7]: tag: the message");
        assert_eq!(record.structured_data["level"]["value"], "high");
        assert_eq!(record.structured_data["code"]["value"], "7");
        assert_eq!(record.message, "tag: the message");
    }

    #[test]
    fn cisco_oversized_key_falls_back_to_entire_frame() {
        let long_key = "a".repeat(33);
        let input = format!("<34>Oct 11 22:14:15 %[{long_key}=high]: tag: the message");
        let record = parse_with(&input);
        assert_eq!(record.message, input);
    }
}
