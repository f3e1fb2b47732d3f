//! The few path operations the file sinks need

use crate::error::{Error, Result};
use error_stack::{IntoReport, Report, ResultExt};
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Make `p` absolute by joining it to the current directory, then drop
/// `.` segments and resolve `..` segments lexically.
///
/// The path does not need to exist and symlinks are not followed, see
/// [`canonical_path`] for that.
pub fn absolute_path<P>(p: &P) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    let p = p.as_ref();
    if p.is_absolute() {
        return Ok(normalize(p));
    }
    let cwd = std::env::current_dir()
        .into_report()
        .change_context_lazy(|| Error::io("cannot resolve current directory"))
        .attach_printable_lazy(|| format!("while resolving `{}`", p.display()))?;
    Ok(normalize(&cwd.join(p)))
}

/// Absolute path of `p` with its deepest existing ancestor canonicalized.
///
/// Two spellings of the same file give the same result as long as they
/// agree on the part that does not exist yet.
pub fn canonical_path<P>(p: &P) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    let mut existing = absolute_path(p)?;
    let mut missing = vec![];
    while !existing.exists() {
        match existing.file_name() {
            Some(name) => missing.push(name.to_os_string()),
            None => break,
        }
        existing.pop();
    }
    let mut canonical = fs::canonicalize(&existing)
        .into_report()
        .change_context_lazy(|| Error::io("cannot canonicalize path"))
        .attach_printable_lazy(|| format!("`{}`", existing.display()))?;
    canonical.extend(missing.iter().rev());
    Ok(canonical)
}

fn normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in p.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Insert `suffix` between the file stem and the extension.
///
/// `logs/app.log` with `_1` becomes `logs/app_1.log`, `logs/app` becomes
/// `logs/app_1`.
pub fn append_basename<P>(p: &P, suffix: &str) -> PathBuf
where
    P: AsRef<Path>,
{
    let p = p.as_ref();
    let mut name = match p.file_stem() {
        Some(stem) => stem.to_os_string(),
        None => OsString::new(),
    };
    name.push(suffix);
    if let Some(ext) = p.extension() {
        name.push(".");
        name.push(ext);
    }
    p.with_file_name(name)
}

/// Create the parent directory of `p` (recursively) if it is missing
pub fn ensure_parent_dir<P>(p: &P) -> Result<()>
where
    P: AsRef<Path>,
{
    let p = p.as_ref();
    match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)
                .into_report()
                .change_context_lazy(|| Error::io("cannot create directory"))
                .attach_printable_lazy(|| format!("`{}`", parent.display()))
        }
        _ => Ok(()),
    }
}

/// Rename `from` to `to`, refusing to overwrite an existing file
pub fn rename_file<P, Q>(from: &P, to: &Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (from, to) = (from.as_ref(), to.as_ref());
    if to.exists() {
        return Err(Report::new(Error::io("rename target exists"))
            .attach_printable(format!("`{}`", to.display())));
    }
    fs::rename(from, to)
        .into_report()
        .change_context_lazy(|| Error::io("cannot rename file"))
        .attach_printable_lazy(|| format!("`{}` -> `{}`", from.display(), to.display()))
}
