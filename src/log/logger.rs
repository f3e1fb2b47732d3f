use super::sink::SinkPtr;
use super::{level_mask_to_string, level_should_log, LogLevel, LogMessage};
use crate::error::{Error, Result};
use crate::fmt::format_string;
use crate::sync::{lockfree, ConcurrentMap};
use error_stack::Report;
use std::fmt::{self, Display, Write};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Named source of log messages.
///
/// A message is written by a sink only if it passes both the logger's mask
/// and that sink's own mask.
#[derive(Debug)]
pub struct Logger {
    name: String,
    level_mask: AtomicI32,
    sinks: lockfree::UnorderedMap<String, SinkPtr>,
    /// Where sink failures are reported
    fallback: Option<Arc<Logger>>,
}

macro_rules! level_methods {
    ($level:expr, $fmt_fn:ident, $value_fn:ident, $line_fn:ident) => {
        /// Log `fmt` with every `{}` replaced by the next argument
        pub fn $fmt_fn(&self, fmt: &str, args: &[&dyn Display]) {
            let mut line = self.log_if_enabled($level);
            if line.is_enabled() {
                line.buffer.push_str(&format_string(fmt, args));
            }
        }

        /// Log a single value
        pub fn $value_fn<T: Display>(&self, value: T) {
            self.log_if_enabled($level).write(value);
        }

        /// Start a message to be built piece by piece
        pub fn $line_fn(&self) -> LineLogger<'_> {
            self.log_if_enabled($level)
        }
    };
}

impl Logger {
    pub fn new(name: &str, level_mask: i32) -> Self {
        Self {
            name: name.to_string(),
            level_mask: AtomicI32::new(level_mask),
            sinks: lockfree::UnorderedMap::new(),
            fallback: None,
        }
    }

    /// Report failing sinks through `fallback` instead of the `log` facade
    pub fn with_fallback(mut self, fallback: Arc<Logger>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn level_mask(&self) -> i32 {
        self.level_mask.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_level_mask(&self, mask: i32) {
        self.level_mask.store(mask, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_log(&self, level: LogLevel) -> bool {
        level_should_log(self.level_mask(), level)
    }

    /// Attach `sink`. Fails if a sink with the same name is attached.
    pub fn attach_sink(&self, sink: SinkPtr) -> Result<()> {
        let name = sink.name();
        if !self.sinks.insert(name.clone(), sink) {
            return Err(Report::new(Error::logic("sink already attached"))
                .attach_printable(format!("sink `{name}` in logger `{}`", self.name)));
        }
        Ok(())
    }

    /// Detach the sink called `name`, returns `false` if it was not attached
    pub fn detach_sink(&self, name: &str) -> bool {
        self.sinks.erase(&name.to_string())
    }

    pub fn detach_all_sinks(&self) {
        self.sinks.clear();
    }

    pub fn get_sink(&self, name: &str) -> Option<SinkPtr> {
        self.sinks.get(&name.to_string())
    }

    /// Names of the attached sinks, sorted
    pub fn sink_names(&self) -> Vec<String> {
        let mut names = self.sinks.snapshot().into_keys().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Flush every attached sink.
    ///
    /// All sinks are flushed even if some fail; the first failure is
    /// returned with the names of the others attached.
    pub fn flush(&self) -> Result<()> {
        let mut failure: Option<Report<Error>> = None;
        let mut others = vec![];
        for sink in self.sinks.snapshot().into_values() {
            if let Err(e) = sink.flush() {
                if failure.is_none() {
                    failure = Some(e);
                } else {
                    others.push(sink.name());
                }
            }
        }
        match failure {
            Some(report) if others.is_empty() => Err(report),
            Some(report) => Err(report.attach_printable(format!(
                "other sinks failed to flush: {}",
                others.join(", ")
            ))),
            None => Ok(()),
        }
    }

    /// Start a message at `level`. It is dropped silently if the logger's
    /// mask rejects `level`.
    pub fn log_if_enabled(&self, level: LogLevel) -> LineLogger<'_> {
        LineLogger {
            logger: self,
            level,
            enabled: self.should_log(level),
            buffer: String::new(),
        }
    }

    level_methods!(LogLevel::Trace, trace, trace_value, trace_line);
    level_methods!(LogLevel::Debug, debug, debug_value, debug_line);
    level_methods!(LogLevel::Info, info, info_value, info_line);
    level_methods!(LogLevel::Warn, warn, warn_value, warn_line);
    level_methods!(LogLevel::Error, error, error_value, error_line);
    level_methods!(LogLevel::Fatal, fatal, fatal_value, fatal_line);

    /// Hand a finished message to every attached sink.
    ///
    /// Sinks are iterated on a snapshot, so attaching or detaching while
    /// logging never blocks on I/O.
    pub fn log_msg(&self, msg: &LogMessage) {
        for sink in self.sinks.snapshot().into_values() {
            if let Err(e) = sink.log(msg) {
                self.report_sink_failure(&sink.name(), &e);
            }
        }
    }

    fn report_sink_failure(&self, sink_name: &str, e: &Report<Error>) {
        match &self.fallback {
            Some(fallback) => fallback.error(
                "logger `{}` cannot write to sink `{}`: {}",
                &[&self.name, &sink_name, e.current_context()],
            ),
            None => log::warn!(
                "logger `{}` cannot write to sink `{sink_name}`: {e:?}",
                self.name
            ),
        }
    }
}

impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Logger `{}` levels: <{}>",
            self.name,
            level_mask_to_string(self.level_mask())
        )?;
        let sinks = self.sinks.snapshot();
        let mut names = sinks.keys().collect::<Vec<_>>();
        names.sort();
        for name in names {
            writeln!(f, "  {}", sinks[name])?;
        }
        Ok(())
    }
}

/// One message under construction.
///
/// The text is delivered to the logger when the `LineLogger` is dropped,
/// or by [`LineLogger::finish`]. A disabled `LineLogger` ignores writes and
/// delivers nothing.
#[derive(Debug)]
pub struct LineLogger<'a> {
    logger: &'a Logger,
    level: LogLevel,
    enabled: bool,
    buffer: String,
}

impl LineLogger<'_> {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Text accumulated so far
    #[inline]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Append the display form of `value`
    pub fn write<T: Display>(&mut self, value: T) -> &mut Self {
        if self.enabled {
            let _ = write!(self.buffer, "{value}");
        }
        self
    }

    /// Drop the message without delivering it
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Deliver now
    pub fn finish(self) {}
}

impl Write for LineLogger<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.enabled {
            self.buffer.push_str(s);
        }
        Ok(())
    }
}

impl Drop for LineLogger<'_> {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        let text = std::mem::take(&mut self.buffer);
        let msg = LogMessage::new(self.logger.name(), self.level, text);
        self.logger.log_msg(&msg);
    }
}
