//! Wrapper to perform file system operations

mod file_editor;
pub use file_editor::*;
mod path;
pub use path::*;

pub const CRLF: &str = "\r\n";
pub const LF: &str = "\n";
#[cfg(windows)]
pub const OS_LINE_ENDING: &str = CRLF;
#[cfg(not(windows))]
pub const OS_LINE_ENDING: &str = LF;
