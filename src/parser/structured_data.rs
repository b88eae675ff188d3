//! SD-ELEMENT parsing, shared by the RFC 5424 grammar and the RFC 3164
//! Cisco `%[key=value]` dialect.
//!
//! Grammar (RFC 5424 §6.3): one or more `[SD-ID PARAM-NAME="PARAM-VALUE" ...]`
//! elements back to back, no separator between elements. Inside a quoted
//! value, `\\`, `\"`, and `\]` are escapes; any other backslash is an error.

use crate::error::ParseErrorKind;
use crate::record::StructuredData;

/// RFC 5424 §6.3.1: SD-ID is a token of at most 32 bytes.
const MAX_SD_ID_LEN: usize = 32;

/// Parses zero or more SD-ELEMENTs starting at `input`.
///
/// Returns the populated map and the remainder of `input` following the
/// last recognized element. A bare `-` (NILVALUE) yields an empty map with
/// the single `-` byte consumed.
pub fn parse(input: &str) -> Result<(StructuredData, &str), ParseErrorKind> {
    let mut data = StructuredData::new();

    if let Some(rest) = input.strip_prefix('-') {
        return Ok((data, rest));
    }

    let mut rest = input;
    while rest.starts_with('[') {
        let (sd_id, params, tail) = parse_element(rest)?;
        data.entry(sd_id).or_default().extend(params);
        rest = tail;
    }
    Ok((data, rest))
}

/// Parses a single `[SD-ID name="value" ...]` element.
fn parse_element(input: &str) -> Result<(String, Vec<(String, String)>, &str), ParseErrorKind> {
    let body = input
        .strip_prefix('[')
        .ok_or(ParseErrorKind::StructuredDataInvalid)?;

    let id_end = body
        .find([' ', ']'])
        .ok_or(ParseErrorKind::StructuredDataInvalid)?;
    let sd_id = &body[..id_end];
    if sd_id.is_empty() {
        return Err(ParseErrorKind::StructuredDataInvalid);
    }
    if sd_id.len() > MAX_SD_ID_LEN {
        return Err(ParseErrorKind::FieldTooLong("sd-id"));
    }
    let mut rest = &body[id_end..];

    let mut params = Vec::new();
    loop {
        rest = rest.trim_start_matches(' ');
        if let Some(tail) = rest.strip_prefix(']') {
            return Ok((sd_id.to_owned(), params, tail));
        }
        let (name, value, tail) = parse_param(rest)?;
        params.push((name, value));
        rest = tail;
    }
}

/// Parses a single `name="value"` pair, unescaping `\\`, `\"`, `\]`.
fn parse_param(input: &str) -> Result<(String, String, &str), ParseErrorKind> {
    let eq = input.find('=').ok_or(ParseErrorKind::StructuredDataInvalid)?;
    let name = &input[..eq];
    if name.is_empty() || name.contains(' ') {
        return Err(ParseErrorKind::StructuredDataInvalid);
    }
    let rest = &input[eq + 1..];
    let rest = rest
        .strip_prefix('"')
        .ok_or(ParseErrorKind::StructuredDataInvalid)?;

    let mut value = String::new();
    let mut chars = rest.char_indices();
    loop {
        let (idx, ch) = chars.next().ok_or(ParseErrorKind::StructuredDataInvalid)?;
        match ch {
            '"' => return Ok((name.to_owned(), value, &rest[idx + 1..])),
            '\\' => {
                let (_, escaped) = chars.next().ok_or(ParseErrorKind::StructuredDataInvalid)?;
                match escaped {
                    '\\' | '"' | ']' => value.push(escaped),
                    _ => return Err(ParseErrorKind::StructuredDataInvalid),
                }
            }
            other => value.push(other),
        }
    }
}
