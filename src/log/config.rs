use super::default_level_mask;
use super::sink::{StderrSink, StdoutSink, DEFAULT_DATETIME_FORMAT, DEFAULT_FORMAT};
use crate::sync::lockbased::Container;

/// Defaults applied to loggers and sinks when they are created.
///
/// Changing a default never touches loggers or sinks that already exist.
#[derive(Debug)]
pub struct LogConfig {
    sink_list: Container<Vec<String>>,
    level_mask: Container<i32>,
    format: Container<String>,
    datetime_format: Container<String>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            sink_list: Container::new(vec![
                StdoutSink::NAME.to_string(),
                StderrSink::NAME.to_string(),
            ]),
            level_mask: Container::new(default_level_mask()),
            format: Container::new(DEFAULT_FORMAT.to_string()),
            datetime_format: Container::new(DEFAULT_DATETIME_FORMAT.to_string()),
        }
    }

    /// Names of the sinks attached to new loggers
    pub fn sink_list(&self) -> Vec<String> {
        self.sink_list.get()
    }

    pub fn set_sink_list(&self, list: Vec<String>) {
        self.sink_list.set(list);
    }

    /// Level mask of new loggers
    pub fn level_mask(&self) -> i32 {
        self.level_mask.get()
    }

    pub fn set_level_mask(&self, mask: i32) {
        self.level_mask.set(mask);
    }

    /// Line template of new sinks
    pub fn format(&self) -> String {
        self.format.get()
    }

    pub fn set_format(&self, format: &str) {
        self.format.set(format.to_string());
    }

    /// `%datetime` template of new sinks
    pub fn datetime_format(&self) -> String {
        self.datetime_format.get()
    }

    pub fn set_datetime_format(&self, datetime_format: &str) {
        self.datetime_format.set(datetime_format.to_string());
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}
