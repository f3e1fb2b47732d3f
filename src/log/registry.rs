use super::sink::SinkPtr;
use super::{LogConfig, Logger};
use crate::error::{Error, Result};
use crate::sync::{lockfree, ConcurrentMap};
use error_stack::Report;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sinks known to a context, keyed by [`Sink::name`](super::sink::Sink::name)
pub type SinkMap = lockfree::UnorderedMap<String, SinkPtr>;

/// Name to logger map.
///
/// New loggers take the level mask and sink list from the [`LogConfig`]
/// at creation time. While the registry is locked, loggers can be looked
/// up but not created or dropped.
#[derive(Debug)]
pub struct LoggerRegistry {
    loggers: lockfree::UnorderedMap<String, Arc<Logger>>,
    locked: AtomicBool,
    config: Arc<LogConfig>,
    sinks: Arc<SinkMap>,
    fallback: Option<Arc<Logger>>,
}

impl LoggerRegistry {
    pub fn new(config: Arc<LogConfig>, sinks: Arc<SinkMap>, fallback: Option<Arc<Logger>>) -> Self {
        Self {
            loggers: lockfree::UnorderedMap::new(),
            locked: AtomicBool::new(false),
            config,
            sinks,
            fallback,
        }
    }

    /// Get the logger called `name`, creating it if needed
    pub fn ensure_get(&self, name: &str) -> Result<Arc<Logger>> {
        loop {
            if let Some(logger) = self.loggers.get(&name.to_string()) {
                return Ok(logger);
            }
            self.check_unlocked("create", name)?;
            let logger = Arc::new(self.new_logger(name));
            if self.loggers.insert(name.to_string(), Arc::clone(&logger)) {
                log::debug!("created logger `{name}`");
                return Ok(logger);
            }
            // another thread created it first, take theirs
        }
    }

    /// Create the logger called `name`. Fails if it exists.
    pub fn create(&self, name: &str) -> Result<Arc<Logger>> {
        self.check_unlocked("create", name)?;
        let logger = Arc::new(self.new_logger(name));
        if !self.loggers.insert(name.to_string(), Arc::clone(&logger)) {
            return Err(Report::new(Error::logic("logger already exists"))
                .attach_printable(format!("`{name}`")));
        }
        Ok(logger)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(&name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains(&name.to_string())
    }

    /// Remove the logger called `name`, returns whether it was registered.
    ///
    /// Handles already given out stay usable.
    pub fn drop_logger(&self, name: &str) -> Result<bool> {
        self.check_unlocked("drop", name)?;
        Ok(self.loggers.erase(&name.to_string()))
    }

    pub fn drop_all(&self) -> Result<()> {
        self.check_unlocked("drop", "*")?;
        self.loggers.clear();
        Ok(())
    }

    /// All loggers at one point in time
    pub fn snapshot(&self) -> HashMap<String, Arc<Logger>> {
        self.loggers.snapshot()
    }

    /// Sorted logger names
    pub fn names(&self) -> Vec<String> {
        let mut names = self.loggers.snapshot().into_keys().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Refuse to create or drop loggers until [`LoggerRegistry::unlock`]
    pub fn lock(&self) {
        self.locked.store(true, Ordering::Release);
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn check_unlocked(&self, action: &str, name: &str) -> Result<()> {
        if self.is_locked() {
            return Err(Report::new(Error::logic("logger registry is locked"))
                .attach_printable(format!("cannot {action} logger `{name}`")));
        }
        Ok(())
    }

    fn new_logger(&self, name: &str) -> Logger {
        let mut logger = Logger::new(name, self.config.level_mask());
        if let Some(fallback) = &self.fallback {
            logger = logger.with_fallback(Arc::clone(fallback));
        }
        for sink_name in self.config.sink_list() {
            if logger.get_sink(&sink_name).is_some() {
                continue;
            }
            match self.sinks.get(&sink_name) {
                // cannot fail, the name was checked above
                Some(sink) => {
                    let _ = logger.attach_sink(sink);
                }
                None => log::debug!("default sink `{sink_name}` not found for `{name}`"),
            }
        }
        logger
    }
}
