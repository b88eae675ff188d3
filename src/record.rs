//! The normalized record produced by the parser.
//!
//! A [`Record`] is built up left-to-right by the parser and then stamped
//! with `raw_ip_address` by the decoder. See [`crate::parser::parse`] for
//! how the fields are populated from the wire format.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Which dialect a record was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rfc {
    /// Legacy BSD syslog (RFC 3164) and its vendor dialects.
    Rfc3164,
    /// RFC 5424, the modern structured-data-capable format.
    Rfc5424,
}

impl Default for Rfc {
    fn default() -> Self {
        Self::Rfc3164
    }
}

/// The 24 standard syslog facilities (`PRI / 8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Facility {
    Kernel = 0,
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    AuthPriv = 10,
    Ftp = 11,
    Ntp = 12,
    Audit = 13,
    Alert = 14,
    Clock = 15,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl Facility {
    /// Decodes a facility from a PRI-derived value in `0..=23`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use Facility::*;
        let facility = match value {
            0 => Kernel,
            1 => User,
            2 => Mail,
            3 => Daemon,
            4 => Auth,
            5 => Syslog,
            6 => Lpr,
            7 => News,
            8 => Uucp,
            9 => Cron,
            10 => AuthPriv,
            11 => Ftp,
            12 => Ntp,
            13 => Audit,
            14 => Alert,
            15 => Clock,
            16 => Local0,
            17 => Local1,
            18 => Local2,
            19 => Local3,
            20 => Local4,
            21 => Local5,
            22 => Local6,
            23 => Local7,
            _ => return None,
        };
        Some(facility)
    }

    /// Returns the numeric value (`0..=23`).
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The 8 standard syslog severities (`PRI % 8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Severity {
    /// Decodes a severity from a PRI-derived value in `0..=7`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use Severity::*;
        let severity = match value {
            0 => Emergency,
            1 => Alert,
            2 => Critical,
            3 => Error,
            4 => Warning,
            5 => Notice,
            6 => Informational,
            7 => Debug,
            _ => return None,
        };
        Some(severity)
    }

    /// Returns the numeric value (`0..=7`).
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Structured-data: SD-ID -> (param-name -> value).
///
/// Per RFC 5424 §6.3.2, a later occurrence of the same SD-ID/param-name
/// pair overwrites an earlier one within the same scope.
pub type StructuredData = HashMap<String, HashMap<String, String>>;

/// A normalized syslog record.
///
/// Constructed empty and populated left-to-right by [`crate::parser::parse`];
/// the decoder is the sole writer of `raw_ip_address`. Once handed to a
/// consumer a record is never mutated further.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub rfc: Rfc,
    pub facility: Option<Facility>,
    pub severity: Option<Severity>,
    pub version: Option<u8>,
    pub timestamp: Option<DateTime<Utc>>,
    pub hostname: Option<String>,
    pub app_name: Option<String>,
    pub process_id: Option<String>,
    pub message_id: Option<String>,
    pub ip_address: Option<String>,
    pub raw_ip_address: Option<String>,
    pub structured_data: StructuredData,
    pub message: String,
}

impl Record {
    /// An empty record tagged with the given dialect.
    pub fn new(rfc: Rfc) -> Self {
        Self {
            rfc,
            ..Default::default()
        }
    }

    /// Sets `facility`/`severity` from a decoded PRI value.
    pub fn with_pri(mut self, facility: Facility, severity: Severity) -> Self {
        self.facility = Some(facility);
        self.severity = Some(severity);
        self
    }
}

impl fmt::Display for Rfc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rfc::Rfc3164 => write!(f, "rfc3164"),
            Rfc::Rfc5424 => write!(f, "rfc5424"),
        }
    }
}
