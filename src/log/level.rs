use crate::error::{Error, Result};
use crate::fmt::split_list;
use error_stack::Report;
use std::fmt;
use std::str::FromStr;

/// Mask with every real level set. `Off` has no bit inside it.
pub const LEVEL_SENTINEL: i32 = 0x3F;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Off = 6,
}

impl LogLevel {
    /// The six levels that can actually be logged, lowest first
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Off => "OFF",
        }
    }

    /// One letter form used by the `%lvl` placeholder
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Trace => "T",
            Self::Debug => "D",
            Self::Info => "I",
            Self::Warn => "W",
            Self::Error => "E",
            Self::Fatal => "F",
            Self::Off => "O",
        }
    }

    #[inline]
    pub fn bit(&self) -> i32 {
        1 << (*self as i32)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Report<Error>;

    /// Full or one letter name, case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        for level in LogLevel::ALL.iter().chain([LogLevel::Off].iter()) {
            if upper == level.as_str() || upper == level.short_name() {
                return Ok(*level);
            }
        }
        Err(Report::new(Error::argument("unknown log level"))
            .attach_printable(format!("`{s}`")))
    }
}

/// Whether a message at `level` passes `mask`
#[inline]
pub fn level_should_log(mask: i32, level: LogLevel) -> bool {
    LEVEL_SENTINEL & mask & level.bit() > 0
}

/// Parse a list of level names separated by whitespace, `|` or `,`.
///
/// `OFF` anywhere gives an empty mask, `ALL` gives every level.
pub fn level_mask_from_string(s: &str) -> Result<i32> {
    let mut mask = 0;
    let mut off = false;
    for token in split_list(s) {
        if token.eq_ignore_ascii_case("all") {
            mask |= LEVEL_SENTINEL;
            continue;
        }
        match token.parse::<LogLevel>()? {
            LogLevel::Off => off = true,
            level => mask |= level.bit(),
        }
    }
    Ok(if off { 0 } else { mask })
}

/// Space separated full names of the levels in `mask`, `OFF` if none
pub fn level_mask_to_string(mask: i32) -> String {
    let names = LogLevel::ALL
        .iter()
        .filter(|level| level_should_log(mask, **level))
        .map(LogLevel::as_str)
        .collect::<Vec<_>>();
    if names.is_empty() {
        LogLevel::Off.as_str().to_string()
    } else {
        names.join(" ")
    }
}

/// All levels in debug builds, `INFO` and above in release builds
pub fn default_level_mask() -> i32 {
    if cfg!(debug_assertions) {
        LEVEL_SENTINEL
    } else {
        LogLevel::Info.bit() | LogLevel::Warn.bit() | LogLevel::Error.bit() | LogLevel::Fatal.bit()
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_should_log_matches_bits() {
        for mask in 0..=0x7F {
            for level in LogLevel::ALL.iter().chain([LogLevel::Off].iter()) {
                let expected = (mask & LEVEL_SENTINEL) & (1 << (*level as i32)) != 0;
                assert_eq!(expected, level_should_log(mask, *level), "{mask:#x} {level}");
            }
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(LogLevel::Warn, "warn".parse().unwrap());
        assert_eq!(LogLevel::Fatal, "F".parse().unwrap());
        assert_eq!(LogLevel::Off, " Off ".parse().unwrap());
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_mask_round_trip() {
        let mask = level_mask_from_string("WARN ERROR").unwrap();
        assert_eq!(LogLevel::Warn.bit() | LogLevel::Error.bit(), mask);
        assert_eq!("WARN ERROR", level_mask_to_string(mask));
    }

    #[test]
    fn test_mask_separators_and_case() {
        let mask = level_mask_from_string("t|d, info").unwrap();
        assert_eq!("TRACE DEBUG INFO", level_mask_to_string(mask));
    }

    #[test]
    fn test_mask_off_and_all() {
        assert_eq!(0, level_mask_from_string("INFO OFF").unwrap());
        assert_eq!(LEVEL_SENTINEL, level_mask_from_string("all").unwrap());
        assert_eq!("OFF", level_mask_to_string(0));
        assert_eq!(0, level_mask_from_string("").unwrap());
    }

    #[test]
    fn test_mask_unknown() {
        assert!(level_mask_from_string("INFO LOUD").is_err());
    }
}
