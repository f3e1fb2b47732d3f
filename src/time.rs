//! Local date-time snapshots

use crate::error::{Error, Result};
use chrono::{Local, Timelike};
use error_stack::Report;
use std::fmt::{self, Write};

/// Placeholder for the sub-second fraction (milliseconds, 3 digits)
pub const FRAC_PLACEHOLDER: &str = "%frac";

/// A point in local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    inner: chrono::DateTime<Local>,
}

impl DateTime {
    /// Current local time
    pub fn local_time() -> Self {
        Self {
            inner: Local::now(),
        }
    }

    #[inline]
    pub fn as_chrono(&self) -> &chrono::DateTime<Local> {
        &self.inner
    }

    /// Milliseconds within the current second
    pub fn millis(&self) -> u32 {
        (self.inner.nanosecond() / 1_000_000).min(999)
    }

    /// Render with a strftime-like pattern.
    ///
    /// On top of the chrono specifiers, `%frac` is replaced with the
    /// milliseconds. `%%` stays an escaped percent sign.
    pub fn format(&self, pattern: &str) -> Result<String> {
        let pattern = self.expand_frac(pattern);
        let mut out = String::with_capacity(pattern.len() + 8);
        write!(out, "{}", self.inner.format(&pattern)).map_err(|_| {
            Report::new(Error::argument("invalid date-time format"))
                .attach_printable(format!("pattern: `{pattern}`"))
        })?;
        Ok(out)
    }

    fn expand_frac(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(i) = rest.find('%') {
            out.push_str(&rest[..i]);
            let after = &rest[i..];
            if after.starts_with("%%") {
                out.push_str("%%");
                rest = &after[2..];
            } else if after.starts_with(FRAC_PLACEHOLDER) {
                let _ = write!(out, "{:03}", self.millis());
                rest = &after[FRAC_PLACEHOLDER.len()..];
            } else {
                out.push('%');
                rest = &after[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl From<chrono::DateTime<Local>> for DateTime {
    fn from(inner: chrono::DateTime<Local>) -> Self {
        Self { inner }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:03}",
            self.inner.format("%Y-%m-%d %H:%M:%S"),
            self.millis()
        )
    }
}
