//! Logging with named loggers and shared sinks
//!
//! A [`Logger`] filters messages by level and hands them to its attached
//! sinks, which filter again by their own level mask and write a line
//! rendered from their format template. Loggers and sinks live in a
//! [`LogContext`], either one built by the caller or the process-wide
//! [`LogContext::global`].
//!
//! ```no_run
//! let logger = zupply::log::get_logger("app").unwrap();
//! logger.info("value={}", &[&42]);
//! logger.warn_line().write("disk at ").write(93).write('%');
//! ```

mod config;
pub use config::*;
mod context;
pub use context::*;
mod level;
pub use level::*;
mod logger;
pub use logger::*;
mod message;
pub use message::*;
mod registry;
pub use registry::*;
mod setup;
pub mod sink;

use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Get or create a logger of the global context
pub fn get_logger(name: &str) -> Result<Arc<Logger>> {
    LogContext::global().get_logger(name)
}

/// Configure the global context from a config file
pub fn config_from_file<P>(path: &P) -> Result<()>
where
    P: AsRef<Path>,
{
    LogContext::global().config_from_file(path)
}

/// Remove a logger from the global context
pub fn drop_logger(name: &str) -> Result<bool> {
    LogContext::global().registry().drop_logger(name)
}

/// Remove every logger from the global context
pub fn drop_all_loggers() -> Result<()> {
    LogContext::global().registry().drop_all()
}

/// Flush every sink of the global context
pub fn flush_all() -> Result<()> {
    LogContext::global().flush()
}
