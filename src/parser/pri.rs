//! PRI header decoding: `<NNN>` -> (facility, severity).

use crate::error::ParseErrorKind;
use crate::record::{Facility, Severity};

/// Maximum valid PRI value: facility 23 * 8 + severity 7.
pub const MAX_PRI: u16 = 191;

/// Parses `<PRI>` from the start of `input`, returning the decoded
/// facility/severity and the remainder starting right after `>`.
///
/// Does not attempt the Cisco sequence-number tolerance; RFC 5424 frames
/// never carry one (see [`parse_tolerant`] for the RFC 3164 path).
pub fn parse(input: &str) -> Result<(Facility, Severity, &str), ParseErrorKind> {
    let Some(rest) = input.strip_prefix('<') else {
        return Err(ParseErrorKind::PriMissing);
    };

    let end = rest.find('>').ok_or(ParseErrorKind::PriMissing)?;
    let (digits, rest) = rest.split_at(end);
    let rest = &rest[1..]; // skip '>'

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::PriInvalid(digits.to_owned()));
    }

    let pri: u16 = digits
        .parse()
        .map_err(|_| ParseErrorKind::PriInvalid(digits.to_owned()))?;
    if pri > MAX_PRI {
        return Err(ParseErrorKind::PriInvalid(digits.to_owned()));
    }

    let facility = Facility::from_u8((pri >> 3) as u8).ok_or(ParseErrorKind::PriInvalid(digits.to_owned()))?;
    let severity = Severity::from_u8((pri & 0x7) as u8).ok_or(ParseErrorKind::PriInvalid(digits.to_owned()))?;

    Ok((facility, severity, rest))
}

/// Like [`parse`], but additionally tolerates a Cisco-style sequence number
/// immediately after the PRI, e.g. `<189>8103: Apr 20 ...` -> the `8103: `
/// is skipped entirely.
pub fn parse_tolerant(input: &str) -> Result<(Facility, Severity, &str), ParseErrorKind> {
    let (facility, severity, rest) = parse(input)?;
    let rest = skip_sequence_number(rest);
    Ok((facility, severity, rest))
}

fn skip_sequence_number(input: &str) -> &str {
    let digits_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if digits_end == 0 {
        return input;
    }
    match input[digits_end..].strip_prefix(": ") {
        Some(rest) => rest,
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_facility_and_severity() {
        let (facility, severity, rest) = parse("<34>1 rest").unwrap();
        assert_eq!(facility, Facility::Auth);
        assert_eq!(severity, Severity::Critical);
        assert_eq!(rest, "1 rest");
    }

    #[test]
    fn pri_round_trip_full_range() {
        for pri in 0u16..=191 {
            let input = format!("<{pri}>rest");
            let (facility, severity, rest) = parse(&input).unwrap();
            assert_eq!(facility.as_u8(), (pri >> 3) as u8);
            assert_eq!(severity.as_u8(), (pri & 0x7) as u8);
            assert_eq!(rest, "rest");
        }
    }

    #[test]
    fn rejects_missing_angle_brackets() {
        assert!(matches!(parse("no pri here"), Err(ParseErrorKind::PriMissing)));
    }

    #[test]
    fn rejects_unterminated_pri() {
        assert!(matches!(parse("<34 rest"), Err(ParseErrorKind::PriMissing)));
    }

    #[test]
    fn rejects_out_of_range_pri() {
        assert!(matches!(parse("<192>rest"), Err(ParseErrorKind::PriInvalid(_))));
        assert!(matches!(parse("<999>rest"), Err(ParseErrorKind::PriInvalid(_))));
    }

    #[test]
    fn rejects_negative_pri() {
        assert!(matches!(parse("<-1>rest"), Err(ParseErrorKind::PriInvalid(_))));
    }

    #[test]
    fn boundary_191_is_valid() {
        let (facility, severity, _) = parse("<191>rest").unwrap();
        assert_eq!(facility, Facility::Local7);
        assert_eq!(severity, Severity::Debug);
    }

    #[test]
    fn tolerant_skips_cisco_sequence_number() {
        let (facility, _, rest) = parse_tolerant("<189>8103: Apr 20 2025").unwrap();
        assert_eq!(facility, Facility::Local7);
        assert_eq!(rest, "Apr 20 2025");
    }

    #[test]
    fn tolerant_leaves_normal_input_untouched() {
        let (_, _, rest) = parse_tolerant("<34>Oct 11 22:14:15 host").unwrap();
        assert_eq!(rest, "Oct 11 22:14:15 host");
    }
}
