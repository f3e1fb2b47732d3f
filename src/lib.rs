//! # zupply
//! A bundle of small utilities built around a multi-sink logging framework.
//!
//! - [`log`](mod@crate::log): named loggers writing to console, file, rotating file and
//!   stream sinks, configurable from an INI-style file
//! - [`cfg`]: the INI-style config parser
//! - [`sync`]: a spin reader-writer lock and concurrent maps built on it
//! - [`fmt`], [`fs`], [`time`]: string, file and date-time helpers
//!
//! Every fallible function returns [`error::Result`].

pub mod cfg;
pub mod error;
pub mod fmt;
pub mod fs;
pub mod log;
pub mod sync;
pub mod time;
