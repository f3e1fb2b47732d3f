//! Log destinations
//!
//! Every sink owns a [`SinkCore`] with its level mask and templates, and
//! implements [`Sink::sink_it`] to write an already formatted line. The
//! default [`Sink::log`] does the filtering and formatting.

use super::{level_mask_to_string, level_should_log, LogMessage};
use crate::error::Result;
use crate::fmt::{substitute_placeholders, ReplaceLineEnding};
use crate::fs::OS_LINE_ENDING;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

mod console;
pub use console::*;
mod file;
pub use file::*;
mod ostream;
pub use ostream::*;
mod rotate;
pub use rotate::*;

/// Default line template
pub const DEFAULT_FORMAT: &str = "[%datetime][T%thread]{%level} %msg";
/// Default template for `%datetime`
pub const DEFAULT_DATETIME_FORMAT: &str = "%y-%m-%d %H:%M:%S.%frac";

/// Shared handle to a sink
pub type SinkPtr = Arc<dyn Sink>;

/// Which variant a sink is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Stdout,
    Stderr,
    SimpleFile,
    RotateFile,
    OStream,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::SimpleFile => "simplefile",
            Self::RotateFile => "rotatefile",
            Self::OStream => "ostream",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Templates {
    format: String,
    datetime_format: String,
}

/// State common to every sink
#[derive(Debug)]
pub struct SinkCore {
    level_mask: AtomicI32,
    templates: Mutex<Templates>,
}

impl SinkCore {
    pub fn new(level_mask: i32, format: &str, datetime_format: &str) -> Self {
        Self {
            level_mask: AtomicI32::new(level_mask),
            templates: Mutex::new(Templates {
                format: format.to_string(),
                datetime_format: datetime_format.to_string(),
            }),
        }
    }

    /// Core with the default templates
    pub fn with_mask(level_mask: i32) -> Self {
        Self::new(level_mask, DEFAULT_FORMAT, DEFAULT_DATETIME_FORMAT)
    }

    #[inline]
    pub fn level_mask(&self) -> i32 {
        self.level_mask.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_level_mask(&self, mask: i32) {
        self.level_mask.store(mask, Ordering::Relaxed);
    }

    pub fn format(&self) -> String {
        self.templates.lock().format.clone()
    }

    pub fn set_format(&self, format: &str) {
        self.templates.lock().format = format.to_string();
    }

    pub fn datetime_format(&self) -> String {
        self.templates.lock().datetime_format.clone()
    }

    pub fn set_datetime_format(&self, datetime_format: &str) {
        self.templates.lock().datetime_format = datetime_format.to_string();
    }

    /// Fill the line template for `msg`, ending with the OS line ending
    pub fn render(&self, msg: &LogMessage) -> Result<String> {
        let templates = self.templates.lock();
        let datetime = msg.time.format(&templates.datetime_format)?;
        let thread = msg.thread_id.to_string();
        let table = [
            ("datetime", datetime.as_str()),
            ("logger", msg.logger_name.as_str()),
            ("thread", thread.as_str()),
            ("level", msg.level.as_str()),
            ("lvl", msg.level.short_name()),
            ("msg", msg.text.as_str()),
        ];
        let line = substitute_placeholders(&templates.format, '%', &table);
        Ok(line.replace_line_ending(OS_LINE_ENDING, true))
    }
}

/// A destination for formatted log lines
pub trait Sink: Send + Sync + fmt::Debug {
    /// Process-wide identity of the sink. Two sinks with the same name are
    /// never registered side by side.
    fn name(&self) -> String;

    fn kind(&self) -> SinkKind;

    fn core(&self) -> &SinkCore;

    /// Write one formatted line
    fn sink_it(&self, line: &str) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Filter `msg` by the sink's mask, format it and write it
    fn log(&self, msg: &LogMessage) -> Result<()> {
        if !level_should_log(self.core().level_mask(), msg.level) {
            return Ok(());
        }
        let line = self.core().render(msg)?;
        self.sink_it(&line)
    }

    fn level_mask(&self) -> i32 {
        self.core().level_mask()
    }

    fn set_level_mask(&self, mask: i32) {
        self.core().set_level_mask(mask)
    }

    fn format(&self) -> String {
        self.core().format()
    }

    fn set_format(&self, format: &str) {
        self.core().set_format(format)
    }

    fn datetime_format(&self) -> String {
        self.core().datetime_format()
    }

    fn set_datetime_format(&self, datetime_format: &str) {
        self.core().set_datetime_format(datetime_format)
    }
}

impl fmt::Display for dyn Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sink<{}> `{}` levels: <{}> format: `{}` datetime: `{}`",
            self.kind(),
            self.name(),
            level_mask_to_string(self.level_mask()),
            self.format(),
            self.datetime_format()
        )
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::log::{LogLevel, LEVEL_SENTINEL};
    use crate::time::DateTime;
    use chrono::{Local, TimeZone};

    fn message(level: LogLevel, text: &str) -> LogMessage {
        let time = Local
            .with_ymd_and_hms(2021, 12, 31, 23, 59, 58)
            .single()
            .unwrap();
        LogMessage {
            logger_name: "app".to_string(),
            level,
            time: DateTime::from(time),
            thread_id: 3,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_render_default() {
        let core = SinkCore::with_mask(LEVEL_SENTINEL);
        let line = core.render(&message(LogLevel::Info, "value=42")).unwrap();
        assert_eq!(
            format!("[21-12-31 23:59:58.000][T3]{{INFO}} value=42{OS_LINE_ENDING}"),
            line
        );
    }

    #[test]
    fn test_render_all_placeholders() {
        let core = SinkCore::new(LEVEL_SENTINEL, "%logger|%lvl|%level|%%msg|%msg", "%H");
        let line = core.render(&message(LogLevel::Warn, "x\n")).unwrap();
        assert_eq!(format!("app|W|WARN|%msg|x{OS_LINE_ENDING}"), line);
    }

    #[test]
    fn test_render_bad_datetime() {
        let core = SinkCore::new(LEVEL_SENTINEL, "%datetime %msg", "%Q");
        assert!(core.render(&message(LogLevel::Warn, "x")).is_err());
    }

    #[test]
    fn test_templates_mutable() {
        let core = SinkCore::with_mask(0);
        core.set_format("%msg");
        core.set_datetime_format("%S");
        core.set_level_mask(LogLevel::Error.bit());
        assert_eq!("%msg", core.format());
        assert_eq!("%S", core.datetime_format());
        assert_eq!(LogLevel::Error.bit(), core.level_mask());
    }
}
