use crate::error::{Error, Result};
use crate::fs::{absolute_path, ensure_parent_dir};
use error_stack::{IntoReport, Report, ResultExt};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// How many times opening a file is attempted before giving up
pub const OPEN_RETRY_TIMES: u32 = 5;
/// Delay between two attempts to open a file
pub const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Append-only text file handle used by the file sinks.
///
/// Opening retries a fixed number of times. When every attempt fails the
/// editor stays closed: [`FileEditor::new`] does not fail, callers check
/// [`FileEditor::is_open`].
#[derive(Debug)]
pub struct FileEditor {
    path: PathBuf,
    file: Option<File>,
    retry_times: u32,
    retry_interval: Duration,
}

impl FileEditor {
    /// Create an editor for `path` and try to open it.
    ///
    /// The path is made absolute first, and missing parent directories are
    /// created. With `truncate`, an existing file is emptied.
    pub fn new<P>(path: &P, truncate: bool) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::with_retry(path, truncate, OPEN_RETRY_TIMES, OPEN_RETRY_INTERVAL)
    }

    /// Same as [`FileEditor::new`] with custom retry settings
    pub fn with_retry<P>(
        path: &P,
        truncate: bool,
        retry_times: u32,
        retry_interval: Duration,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut editor = Self {
            path: absolute_path(path)?,
            file: None,
            retry_times: retry_times.max(1),
            retry_interval,
        };
        if let Err(e) = editor.open(truncate) {
            log::debug!("file editor left closed: {e:?}");
        }
        Ok(editor)
    }

    /// Open the file, retrying on failure. Does nothing if already open.
    pub fn open(&mut self, truncate: bool) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        ensure_parent_dir(&self.path)?;
        let mut last_error = None;
        for attempt in 0..self.retry_times {
            if attempt > 0 {
                thread::sleep(self.retry_interval);
            }
            let mut options = OpenOptions::new();
            options.create(true);
            if truncate {
                options.write(true).truncate(true);
            } else {
                options.append(true);
            }
            match options.open(&self.path) {
                Ok(file) => {
                    self.file = Some(file);
                    return Ok(());
                }
                Err(e) => {
                    log::debug!(
                        "cannot open `{}` (attempt {}): {e}",
                        self.path.display(),
                        attempt + 1
                    );
                    last_error = Some(e);
                }
            }
        }
        let report = match last_error {
            Some(e) => Report::new(e).change_context(Error::io("cannot open file")),
            None => Report::new(Error::io("cannot open file")),
        };
        Err(report.attach_printable(format!(
            "`{}` after {} attempt(s)",
            self.path.display(),
            self.retry_times
        )))
    }

    /// Close and open again
    pub fn reopen(&mut self, truncate: bool) -> Result<()> {
        self.close();
        self.open(truncate)
    }

    /// Flush and release the file handle
    pub fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the file on disk, 0 if it does not exist
    pub fn len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole string at the end of the file
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        let path = &self.path;
        match &mut self.file {
            Some(file) => file
                .write_all(s.as_bytes())
                .into_report()
                .change_context_lazy(|| Error::io("cannot write file"))
                .attach_printable_lazy(|| format!("`{}`", path.display())),
            None => Err(Report::new(Error::io("file is not open"))
                .attach_printable(format!("`{}`", path.display()))),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        let path = &self.path;
        match &mut self.file {
            Some(file) => file
                .flush()
                .into_report()
                .change_context_lazy(|| Error::io("cannot flush file"))
                .attach_printable_lazy(|| format!("`{}`", path.display())),
            None => Ok(()),
        }
    }
}

impl Drop for FileEditor {
    fn drop(&mut self) {
        self.close();
    }
}
