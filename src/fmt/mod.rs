//! String helpers
//!
//! Small text utilities shared by the config parser and the logging
//! framework. User facing `{}` formatting lives in [`format_string`],
//! the `%name` template substitution used by sinks lives in
//! [`substitute_placeholders`]. The two syntaxes are unrelated.

mod string;
pub use string::*;
