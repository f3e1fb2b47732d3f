use super::registry::{LoggerRegistry, SinkMap};
use super::sink::{
    file_sink_name, OStreamSink, RotateFileSink, SimpleFileSink, SinkKind, SinkPtr, StderrSink,
    StdoutSink,
};
use super::{level_mask_to_string, LogConfig, Logger, LEVEL_SENTINEL};
use crate::error::{Error, Result};
use crate::sync::ConcurrentMap;
use error_stack::Report;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Name of the logger that reports failures of the logging machinery
pub const INTERNAL_LOGGER_NAME: &str = "zupply";

/// Everything one logging setup owns: the defaults, the sinks, and the
/// loggers.
///
/// Contexts are independent of each other. Most programs use the one from
/// [`LogContext::global`], tests usually build their own.
#[derive(Debug)]
pub struct LogContext {
    config: Arc<LogConfig>,
    sinks: Arc<SinkMap>,
    registry: LoggerRegistry,
    stdout: SinkPtr,
    stderr: SinkPtr,
    internal: Arc<Logger>,
}

impl LogContext {
    pub fn new() -> Self {
        let config = Arc::new(LogConfig::new());
        let sinks = Arc::new(SinkMap::new());
        let stdout: SinkPtr = Arc::new(StdoutSink::new());
        let stderr: SinkPtr = Arc::new(StderrSink::new());
        sinks.replace(stdout.name(), Arc::clone(&stdout));
        sinks.replace(stderr.name(), Arc::clone(&stderr));

        // the internal logger is not in the registry and cannot be dropped
        let internal = Logger::new(INTERNAL_LOGGER_NAME, LEVEL_SENTINEL);
        let _ = internal.attach_sink(Arc::clone(&stderr));
        let internal = Arc::new(internal);

        let registry = LoggerRegistry::new(
            Arc::clone(&config),
            Arc::clone(&sinks),
            Some(Arc::clone(&internal)),
        );
        Self {
            config,
            sinks,
            registry,
            stdout,
            stderr,
            internal,
        }
    }

    /// The process-wide context, created on first use
    pub fn global() -> &'static LogContext {
        static GLOBAL: OnceLock<LogContext> = OnceLock::new();
        GLOBAL.get_or_init(LogContext::new)
    }

    #[inline]
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    /// Get or create the logger called `name`
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>> {
        self.registry.ensure_get(name)
    }

    /// The logger sink failures are reported to
    pub fn internal_logger(&self) -> Arc<Logger> {
        Arc::clone(&self.internal)
    }

    pub fn stdout_sink(&self) -> SinkPtr {
        Arc::clone(&self.stdout)
    }

    pub fn stderr_sink(&self) -> SinkPtr {
        Arc::clone(&self.stderr)
    }

    /// Registered sink by its [`Sink::name`](super::sink::Sink::name)
    pub fn get_sink(&self, name: &str) -> Option<SinkPtr> {
        self.sinks.get(&name.to_string())
    }

    /// Sorted names of the registered sinks
    pub fn sink_names(&self) -> Vec<String> {
        let mut names = self.sinks.snapshot().into_keys().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Sink appending to `path`.
    ///
    /// Asking twice for the same file returns the sink created the first
    /// time, and `truncate` is ignored then. It is an error if the file
    /// already backs a sink of another kind.
    pub fn new_simple_file_sink<P>(&self, path: &P, truncate: bool) -> Result<SinkPtr>
    where
        P: AsRef<Path>,
    {
        let name = file_sink_name(path)?;
        if let Some(existing) = self.existing_file_sink(&name, SinkKind::SimpleFile)? {
            return Ok(existing);
        }
        let sink: SinkPtr = Arc::new(SimpleFileSink::new(path, truncate)?);
        self.register_file_sink(sink, SinkKind::SimpleFile)
    }

    /// Rotating sink writing to `path`, with the same reuse rules as
    /// [`LogContext::new_simple_file_sink`]
    pub fn new_rotate_file_sink<P>(&self, path: &P, max_bytes: u64, backup: bool) -> Result<SinkPtr>
    where
        P: AsRef<Path>,
    {
        let name = file_sink_name(path)?;
        if let Some(existing) = self.existing_file_sink(&name, SinkKind::RotateFile)? {
            return Ok(existing);
        }
        let sink: SinkPtr = Arc::new(RotateFileSink::new(path, max_bytes, backup)?);
        self.register_file_sink(sink, SinkKind::RotateFile)
    }

    /// Sink writing to `out`. Fails if `name` is taken.
    pub fn new_ostream_sink<W>(&self, name: &str, out: W, force_flush: bool) -> Result<SinkPtr>
    where
        W: Write + Send + 'static,
    {
        let sink: SinkPtr = Arc::new(OStreamSink::new(name, out, force_flush));
        self.apply_templates(&sink);
        if !self.sinks.insert(name.to_string(), Arc::clone(&sink)) {
            return Err(Report::new(Error::logic("sink name already in use"))
                .attach_printable(format!("`{name}`")));
        }
        Ok(sink)
    }

    /// Unregister the sink called `name` and detach it from every logger
    pub fn drop_sink(&self, name: &str) -> bool {
        let removed = self.sinks.erase(&name.to_string());
        for logger in self.registry.snapshot().into_values() {
            logger.detach_sink(name);
        }
        self.internal.detach_sink(name);
        removed
    }

    /// Flush every registered sink, returning the first failure
    pub fn flush(&self) -> Result<()> {
        let mut result = Ok(());
        for sink in self.sinks.snapshot().into_values() {
            if let Err(e) = sink.flush() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Human readable state of the whole context
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Config: levels <{}> sinks [{}]",
            level_mask_to_string(self.config.level_mask()),
            self.config.sink_list().join(", ")
        );
        let _ = writeln!(out, "  format: {}", self.config.format());
        let _ = writeln!(out, "  datetime_format: {}", self.config.datetime_format());
        let sinks = self.sinks.snapshot();
        for name in self.sink_names() {
            if let Some(sink) = sinks.get(&name) {
                let _ = writeln!(out, "{sink}");
            }
        }
        let loggers = self.registry.snapshot();
        for name in self.registry.names() {
            if let Some(logger) = loggers.get(&name) {
                let _ = write!(out, "{logger}");
            }
        }
        out
    }

    fn existing_file_sink(&self, name: &str, kind: SinkKind) -> Result<Option<SinkPtr>> {
        match self.sinks.get(&name.to_string()) {
            Some(sink) if sink.kind() == kind => Ok(Some(sink)),
            Some(sink) => Err(Report::new(Error::logic("file already used by another sink"))
                .attach_printable(format!("`{name}` is a {} sink, not {kind}", sink.kind()))),
            None => Ok(None),
        }
    }

    fn register_file_sink(&self, sink: SinkPtr, kind: SinkKind) -> Result<SinkPtr> {
        self.apply_templates(&sink);
        let name = sink.name();
        if self.sinks.insert(name.clone(), Arc::clone(&sink)) {
            return Ok(sink);
        }
        // lost a race with another thread opening the same file
        self.existing_file_sink(&name, kind)?
            .ok_or_else(|| Report::new(Error::runtime("file sink vanished while registering")))
    }

    fn apply_templates(&self, sink: &SinkPtr) {
        sink.set_format(&self.config.format());
        sink.set_datetime_format(&self.config.datetime_format());
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}
