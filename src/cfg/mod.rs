//! INI-style config parser
//!
//! ```text
//! # comment
//! ; also a comment
//! [global]
//! levels = INFO WARN
//! [sinks.file]
//! type: simplefile
//! filename = 'logs/app.log'
//! ```
//!
//! Section names nest on `.`, keys and values are separated by the first
//! `=` or `:` on the line, surrounding quotes are stripped from values.

mod level;
pub use level::*;
mod parser;
pub use parser::*;
