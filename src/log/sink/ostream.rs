use super::{Sink, SinkCore, SinkKind};
use crate::error::{Error, Result};
use crate::log::LEVEL_SENTINEL;
use derivative::Derivative;
use error_stack::{IntoReport, ResultExt};
use parking_lot::Mutex;
use std::io::Write;

/// Sink writing to any caller provided stream
#[derive(Derivative)]
#[derivative(Debug)]
pub struct OStreamSink {
    name: String,
    core: SinkCore,
    #[derivative(Debug = "ignore")]
    out: Mutex<Box<dyn Write + Send>>,
    /// Flush after every line
    force_flush: bool,
}

impl OStreamSink {
    /// The caller picks the name, which must be unique among the sinks of
    /// the context the sink is registered in.
    pub fn new<W>(name: &str, out: W, force_flush: bool) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            name: name.to_string(),
            core: SinkCore::with_mask(LEVEL_SENTINEL),
            out: Mutex::new(Box::new(out)),
            force_flush,
        }
    }
}

impl Sink for OStreamSink {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::OStream
    }

    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn sink_it(&self, line: &str) -> Result<()> {
        let mut out = self.out.lock();
        out.write_all(line.as_bytes())
            .into_report()
            .change_context_lazy(|| Error::io("cannot write to stream"))
            .attach_printable_lazy(|| format!("sink `{}`", self.name))?;
        if self.force_flush {
            out.flush()
                .into_report()
                .change_context_lazy(|| Error::io("cannot flush stream"))
                .attach_printable_lazy(|| format!("sink `{}`", self.name))?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.out
            .lock()
            .flush()
            .into_report()
            .change_context_lazy(|| Error::io("cannot flush stream"))
            .attach_printable_lazy(|| format!("sink `{}`", self.name))
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::log::{LogLevel, LogMessage};
    use std::sync::Arc;

    /// Cloneable in-memory stream
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn test_sink_level_filter() {
        let buf = Shared::default();
        let sink = OStreamSink::new("mem", buf.clone(), true);
        sink.set_format("%lvl %msg");
        sink.set_level_mask(LogLevel::Error.bit() | LogLevel::Fatal.bit());
        sink.log(&LogMessage::new("app", LogLevel::Trace, "quiet".to_string()))
            .unwrap();
        assert_eq!("", buf.text());
        sink.log(&LogMessage::new("app", LogLevel::Error, "loud".to_string()))
            .unwrap();
        assert_eq!(format!("E loud{}", crate::fs::OS_LINE_ENDING), buf.text());
    }

    #[test]
    fn test_debug_skips_stream() {
        let sink = OStreamSink::new("mem", Shared::default(), false);
        let dump = format!("{sink:?}");
        assert!(dump.contains("mem"));
        assert!(!dump.contains("out:"));
    }
}
