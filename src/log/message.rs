use super::LogLevel;
use crate::time::DateTime;
use std::thread;

/// One log record, built when a [`LineLogger`](super::LineLogger) is
/// delivered and handed to every sink of the logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub logger_name: String,
    pub level: LogLevel,
    pub time: DateTime,
    pub thread_id: u64,
    pub text: String,
}

impl LogMessage {
    /// Stamp `text` with the current local time and thread
    pub fn new(logger_name: &str, level: LogLevel, text: String) -> Self {
        Self {
            logger_name: logger_name.to_string(),
            level,
            time: DateTime::local_time(),
            thread_id: current_thread_id(),
            text,
        }
    }
}

/// Numeric id of the calling thread
///
/// `ThreadId` has no stable integer accessor, so the number is taken from
/// its debug form, `ThreadId(N)`.
pub fn current_thread_id() -> u64 {
    let id = format!("{:?}", thread::current().id());
    id.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_thread_ids_differ() {
        let here = current_thread_id();
        let there = thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(0, here);
        assert_ne!(here, there);
    }

    #[test]
    fn test_new_stamps() {
        let msg = LogMessage::new("app", LogLevel::Info, "hi".to_string());
        assert_eq!("app", msg.logger_name);
        assert_eq!(current_thread_id(), msg.thread_id);
    }
}
