use super::{file_sink_name, Sink, SinkCore, SinkKind};
use crate::error::{Error, Result};
use crate::fs::{append_basename, rename_file, FileEditor};
use crate::log::LEVEL_SENTINEL;
use crate::time::DateTime;
use error_stack::Report;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Default rotation threshold, 4 MiB
pub const DEFAULT_ROTATE_BYTES: u64 = 4 * 1024 * 1024;
/// Suffix appended to the file stem of a backup, `_YY-MM-DD_HH-MM-SS-fff`
pub const BACKUP_SUFFIX_FORMAT: &str = "_%y-%m-%d_%H-%M-%S-%frac";

#[derive(Debug)]
struct RotateState {
    editor: FileEditor,
    current_size: u64,
}

/// File sink that starts over once the file reaches a size threshold.
///
/// The size check runs after each write, so a file can grow past the
/// threshold by at most one line. On rotation the file is either renamed
/// to a timestamped backup and replaced by an empty one, or truncated in
/// place.
#[derive(Debug)]
pub struct RotateFileSink {
    name: String,
    core: SinkCore,
    state: Mutex<RotateState>,
    max_bytes: u64,
    backup: bool,
}

impl RotateFileSink {
    /// Open `path` for appending. The size of an existing file counts
    /// toward the first rotation.
    pub fn new<P>(path: &P, max_bytes: u64, backup: bool) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        if max_bytes == 0 {
            return Err(Report::new(Error::argument("rotation threshold must be positive")));
        }
        let editor = FileEditor::new(path, false)?;
        if !editor.is_open() {
            return Err(Report::new(Error::io("cannot open log file"))
                .attach_printable(format!("`{}`", editor.path().display())));
        }
        Ok(Self {
            name: file_sink_name(&editor.path())?,
            core: SinkCore::with_mask(LEVEL_SENTINEL),
            state: Mutex::new(RotateState {
                current_size: editor.len(),
                editor,
            }),
            max_bytes,
            backup,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.state.lock().editor.path().to_path_buf()
    }

    #[inline]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    #[inline]
    pub fn backup(&self) -> bool {
        self.backup
    }

    /// Bytes written since the last rotation
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    fn rotate(&self, state: &mut RotateState) -> Result<()> {
        state.current_size = 0;
        if !self.backup {
            log::debug!("truncating `{}`", state.editor.path().display());
            return state.editor.reopen(true);
        }

        state.editor.close();
        let path = state.editor.path().to_path_buf();
        let renamed = backup_path(&path).and_then(|backup| {
            log::debug!("rotating `{}` to `{}`", path.display(), backup.display());
            rename_file(&path, &backup)
        });
        // keep logging to the original path even if the backup failed, the
        // next attempt waits for the threshold to be crossed again
        let reopened = state.editor.open(false);
        renamed.and(reopened)
    }
}

/// First free backup name for `path`
fn backup_path(path: &Path) -> Result<PathBuf> {
    let suffix = DateTime::local_time().format(BACKUP_SUFFIX_FORMAT)?;
    let mut candidate = append_basename(&path, &suffix);
    let mut n = 1;
    while candidate.exists() {
        candidate = append_basename(&path, &format!("{suffix}_{n}"));
        n += 1;
    }
    Ok(candidate)
}

impl Sink for RotateFileSink {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::RotateFile
    }

    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn sink_it(&self, line: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.editor.write_str(line)?;
        state.current_size += line.len() as u64;
        if state.current_size >= self.max_bytes {
            self.rotate(&mut state)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().editor.flush()
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::log::{LogLevel, LogMessage};

    fn out_dir(name: &str) -> PathBuf {
        let dir = Path::new("target").join("test_out").join("rotate").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sink_at(path: &Path, max_bytes: u64, backup: bool) -> RotateFileSink {
        let sink = RotateFileSink::new(&path, max_bytes, backup).unwrap();
        sink.set_format("%msg");
        sink
    }

    fn log(sink: &RotateFileSink, text: &str) {
        sink.log(&LogMessage::new("r", LogLevel::Info, text.to_string()))
            .unwrap();
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_zero_threshold() {
        let path = out_dir("zero").join("r.log");
        let err = RotateFileSink::new(&path, 0, false).unwrap_err();
        assert_eq!(crate::error::ErrorKind::Argument, err.current_context().kind);
    }

    #[test]
    fn test_truncate_in_place() {
        let dir = out_dir("truncate");
        let path = dir.join("r.log");
        let sink = sink_at(&path, 10, false);
        log(&sink, "12345");
        assert!(sink.current_size() > 0);
        // crosses the threshold, written then truncated
        log(&sink, "67890");
        assert_eq!(0, sink.current_size());
        assert_eq!("", std::fs::read_to_string(&path).unwrap());
        log(&sink, "abc");
        sink.flush().unwrap();
        let expected = format!("abc{}", crate::fs::OS_LINE_ENDING);
        assert_eq!(expected, std::fs::read_to_string(&path).unwrap());
        assert_eq!(vec!["r.log"], files_in(&dir));
    }

    #[test]
    fn test_backup() {
        let dir = out_dir("backup");
        let path = dir.join("r.log");
        let sink = sink_at(&path, 8, true);
        log(&sink, "first line");
        assert_eq!(0, sink.current_size());
        let files = files_in(&dir);
        assert_eq!(2, files.len());
        let backup = files.iter().find(|f| f.as_str() != "r.log").unwrap();
        assert!(backup.starts_with("r_"));
        assert!(backup.ends_with(".log"));
        let expected = format!("first line{}", crate::fs::OS_LINE_ENDING);
        assert_eq!(expected, std::fs::read_to_string(dir.join(backup)).unwrap());
        assert_eq!("", std::fs::read_to_string(&path).unwrap());

        // a second rotation within the same millisecond must not clobber the first
        log(&sink, "second line");
        log(&sink, "third line");
        assert_eq!(4, files_in(&dir).len());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_backup_waits_for_next_threshold() {
        let dir = out_dir("failed_backup");
        let path = dir.join("r.log");
        let sink = sink_at(&path, 8, true);
        log(&sink, "abc");
        // the open handle survives, but there is nothing left to rename
        std::fs::remove_file(&path).unwrap();
        let failed = sink.log(&LogMessage::new("r", LogLevel::Info, "defgh".to_string()));
        assert!(failed.is_err());
        assert_eq!(0, sink.current_size());
        log(&sink, "x");
        log(&sink, "y");
        assert_eq!(vec!["r.log"], files_in(&dir));
        sink.flush().unwrap();
        assert_eq!("x\ny\n", std::fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_existing_size_counts() {
        let path = out_dir("existing").join("r.log");
        std::fs::write(&path, "0123456789").unwrap();
        let sink = sink_at(&path, 12, false);
        assert_eq!(10, sink.current_size());
        log(&sink, "ab");
        assert_eq!(0, sink.current_size());
    }
}
