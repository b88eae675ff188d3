//! `bytes -> Record`, always. See `SPEC_FULL.md` §4.1 for the full grammar;
//! this module only wires the two dialects together.
//!
//! RFC 5424 is attempted first, since every well-formed 5424 frame starts
//! with an unambiguous `<PRI>1 ` header. Any failure -- the header not
//! matching, or any later field failing -- falls back to the RFC 3164
//! path, which never fails: worst case it returns a record whose `message`
//! is the entire original frame.

pub(crate) mod pri;
mod rfc3164;
mod rfc5424;
mod structured_data;
pub(crate) mod timestamp;

pub use timestamp::TimezoneTable;

use crate::clock::Clock;
use crate::record::Record;

/// Parses one syslog frame. Never panics, never returns an error: on total
/// failure the returned record carries the original bytes verbatim as
/// `message`, with `facility`/`severity` set if the PRI header alone was
/// recognizable.
pub fn parse(bytes: &[u8], clock: &dyn Clock, tz_table: &TimezoneTable) -> Record {
    let text = String::from_utf8_lossy(bytes);
    match rfc5424::parse(&text) {
        Ok(record) => record,
        Err(_) => rfc3164::parse(&text, clock, tz_table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::record::Rfc;

    fn parse_str(input: &str) -> Record {
        parse(input.as_bytes(), &FixedClock::new(2024), &TimezoneTable::default())
    }

    #[test]
    fn recognizes_5424_over_3164() {
        let record = parse_str("<34>1 1985-04-12T23:20:50.52Z host app - - - hi");
        assert_eq!(record.rfc, Rfc::Rfc5424);
    }

    #[test]
    fn falls_back_to_3164_when_version_is_not_one() {
        let record = parse_str("<34>Oct 11 22:14:15 mymachine su: msg");
        assert_eq!(record.rfc, Rfc::Rfc3164);
    }

    #[test]
    fn over_precise_fraction_falls_back_and_preserves_pri() {
        let input = "<34>1 2003-08-24T05:14:15.000000003-07:00 host app - - - msg";
        let record = parse_str(input);
        assert_eq!(record.rfc, Rfc::Rfc3164);
        assert_eq!(record.facility.unwrap().as_u8(), 4);
        assert_eq!(record.severity.unwrap().as_u8(), 2);
        assert!(record.timestamp.is_none());
        assert_eq!(record.message, input);
    }

    #[test]
    fn pri_round_trip_property() {
        for pri in 0u16..=191 {
            let input = format!("<{pri}>1 - - - - - -");
            let record = parse_str(&input);
            assert_eq!(record.facility.unwrap().as_u8(), (pri >> 3) as u8);
            assert_eq!(record.severity.unwrap().as_u8(), (pri & 0x7) as u8);
        }
    }

    #[test]
    fn never_panics_on_arbitrary_bytes() {
        let inputs: &[&[u8]] = &[b"", b"<", b">", b"<999999999999999999>", b"\xff\xfe\x00", b"<34>1 ---"];
        for input in inputs {
            let _ = parse(input, &FixedClock::new(2024), &TimezoneTable::default());
        }
    }
}
