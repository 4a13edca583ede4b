use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

/// Logging shorthands bound to an adapter namespace.
///
/// Every line goes through the `log` facade with the namespace as target, so
/// whatever logger the host installs receives it. Each method returns the
/// rendered message, which lets callers log and reuse it in one expression
/// (e.g. as an error payload).
#[derive(Debug)]
pub struct Logger {
    target: String,
    debug: AtomicBool,
}

impl Logger {
    pub fn new(target: impl Into<String>) -> Self {
        Logger {
            target: target.into(),
            debug: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// When enabled, debug lines are promoted to info so they show up without
    /// lowering the host's log level.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn debug(&self, msg: impl Display) -> String {
        let msg = msg.to_string();
        if self.is_debug() {
            log::info!(target: &self.target, "debug: {}", msg);
        } else {
            log::debug!(target: &self.target, "{}", msg);
        }
        msg
    }

    pub fn info(&self, msg: impl Display) -> String {
        let msg = msg.to_string();
        log::info!(target: &self.target, "{}", msg);
        msg
    }

    pub fn warn(&self, msg: impl Display) -> String {
        let msg = msg.to_string();
        log::warn!(target: &self.target, "{}", msg);
        msg
    }

    pub fn error(&self, msg: impl Display) -> String {
        let msg = msg.to_string();
        log::error!(target: &self.target, "{}", msg);
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_returns_message() {
        let logger = Logger::new("demo.0");
        assert_eq!(logger.target(), "demo.0");
        assert_eq!(logger.info(format_args!("value {}", 3)), "value 3");
        assert_eq!(logger.warn("careful"), "careful");
        assert_eq!(logger.error("broken"), "broken");
    }

    #[test]
    fn test_debug_flag_toggles() {
        let logger = Logger::new("demo.0");
        assert!(!logger.is_debug());
        logger.set_debug(true);
        assert!(logger.is_debug());
        assert_eq!(logger.debug("trace me"), "trace me");
    }
}
