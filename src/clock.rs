//! An injectable "now" provider.
//!
//! Reading wall-clock time inside the parser is a testability hazard --
//! the RFC 3164 "no year given" dialect defaults to the current UTC year,
//! and tests need to pin that year rather than chase whatever the system
//! clock says. [`Clock`] is the seam; [`SystemClock`] is the production
//! default and [`FixedClock`] is what tests inject.

use chrono::{Datelike, Utc};

/// Supplies the current UTC year to the RFC 3164 timestamp dialects.
pub trait Clock: Send + Sync {
    /// The current UTC year, read once per `parse` call.
    fn current_year(&self) -> i32;
}

/// Reads the real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Utc::now().year()
    }
}

/// A clock pinned to a fixed year, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    year: i32,
}

impl FixedClock {
    pub fn new(year: i32) -> Self {
        Self { year }
    }
}

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.year
    }
}
