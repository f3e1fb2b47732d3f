use super::{Sink, SinkCore, SinkKind};
use crate::error::{Error, Result};
use error_stack::{IntoReport, ResultExt};
use std::io::{self, Write};

/// Default mask of [`StdoutSink`]: `TRACE DEBUG INFO`
pub const STDOUT_LEVEL_MASK: i32 = 0x07;
/// Default mask of [`StderrSink`]: `WARN ERROR FATAL`
pub const STDERR_LEVEL_MASK: i32 = 0x38;

/// Sink writing to the process standard output.
///
/// One instance is owned by each [`LogContext`](crate::log::LogContext).
/// Its default mask is disjoint from [`StderrSink`]'s, so a logger with both
/// attached prints each message once.
#[derive(Debug)]
pub struct StdoutSink {
    core: SinkCore,
}

impl StdoutSink {
    pub const NAME: &'static str = "stdout";

    pub fn new() -> Self {
        Self {
            core: SinkCore::with_mask(STDOUT_LEVEL_MASK),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StdoutSink {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Stdout
    }

    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn sink_it(&self, line: &str) -> Result<()> {
        io::stdout()
            .lock()
            .write_all(line.as_bytes())
            .into_report()
            .change_context_lazy(|| Error::io("cannot write to stdout"))
    }

    fn flush(&self) -> Result<()> {
        io::stdout()
            .flush()
            .into_report()
            .change_context_lazy(|| Error::io("cannot flush stdout"))
    }
}

/// Sink writing to the process standard error, see [`StdoutSink`]
#[derive(Debug)]
pub struct StderrSink {
    core: SinkCore,
}

impl StderrSink {
    pub const NAME: &'static str = "stderr";

    pub fn new() -> Self {
        Self {
            core: SinkCore::with_mask(STDERR_LEVEL_MASK),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StderrSink {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Stderr
    }

    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn sink_it(&self, line: &str) -> Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(line.as_bytes())
            .and_then(|_| err.flush())
            .into_report()
            .change_context_lazy(|| Error::io("cannot write to stderr"))
    }

    fn flush(&self) -> Result<()> {
        io::stderr()
            .flush()
            .into_report()
            .change_context_lazy(|| Error::io("cannot flush stderr"))
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::log::{level_should_log, LogLevel};

    #[test]
    fn test_default_masks_disjoint() {
        for level in LogLevel::ALL {
            assert_ne!(
                level_should_log(STDOUT_LEVEL_MASK, level),
                level_should_log(STDERR_LEVEL_MASK, level),
                "{level}"
            );
        }
        assert!(level_should_log(StdoutSink::new().level_mask(), LogLevel::Info));
        assert!(level_should_log(StderrSink::new().level_mask(), LogLevel::Fatal));
    }
}
