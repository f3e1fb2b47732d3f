use super::{Sink, SinkCore, SinkKind};
use crate::error::{Error, Result};
use crate::fs::{canonical_path, FileEditor};
use crate::log::LEVEL_SENTINEL;
use error_stack::Report;
use parking_lot::Mutex;
use std::path::Path;

/// Name shared by every file backed sink writing to `path`.
///
/// Keying file sinks on the canonical path keeps two sinks from writing to
/// the same file through one context.
pub fn file_sink_name<P>(path: &P) -> Result<String>
where
    P: AsRef<Path>,
{
    Ok(format!("file:{}", canonical_path(path)?.display()))
}

/// Sink appending to a plain file
#[derive(Debug)]
pub struct SimpleFileSink {
    name: String,
    core: SinkCore,
    editor: Mutex<FileEditor>,
}

impl SimpleFileSink {
    /// Open `path` for appending, or emptied first with `truncate`
    pub fn new<P>(path: &P, truncate: bool) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let editor = FileEditor::new(path, truncate)?;
        if !editor.is_open() {
            return Err(Report::new(Error::io("cannot open log file"))
                .attach_printable(format!("`{}`", editor.path().display())));
        }
        Ok(Self {
            name: file_sink_name(&editor.path())?,
            core: SinkCore::with_mask(LEVEL_SENTINEL),
            editor: Mutex::new(editor),
        })
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.editor.lock().path().to_path_buf()
    }
}

impl Sink for SimpleFileSink {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::SimpleFile
    }

    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn sink_it(&self, line: &str) -> Result<()> {
        self.editor.lock().write_str(line)
    }

    fn flush(&self) -> Result<()> {
        self.editor.lock().flush()
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::log::{LogLevel, LogMessage};

    fn out_dir(name: &str) -> std::path::PathBuf {
        let dir = Path::new("target").join("test_out").join("file_sink").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_writes_rendered_lines() {
        let path = out_dir("rendered").join("a.log");
        std::fs::write(&path, "old\n").unwrap();
        let sink = SimpleFileSink::new(&path, false).unwrap();
        sink.set_format("%logger:%lvl %msg");
        sink.log(&LogMessage::new("app", LogLevel::Warn, "value=42".to_string()))
            .unwrap();
        sink.flush().unwrap();
        let expected = format!("old\napp:W value=42{}", crate::fs::OS_LINE_ENDING);
        assert_eq!(expected, std::fs::read_to_string(&path).unwrap());
        assert_eq!(file_sink_name(&path).unwrap(), sink.name());
        assert!(sink.name().starts_with("file:"));
    }

    #[test]
    fn test_truncate() {
        let path = out_dir("truncate").join("a.log");
        std::fs::write(&path, "old\n").unwrap();
        let _sink = SimpleFileSink::new(&path, true).unwrap();
        assert_eq!("", std::fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_unopenable() {
        let dir = out_dir("unopenable");
        let err = SimpleFileSink::new(&dir, false).unwrap_err();
        assert_eq!(crate::error::ErrorKind::Io, err.current_context().kind);
    }
}
