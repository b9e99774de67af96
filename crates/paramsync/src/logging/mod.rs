//! Logging for synchronization runs.
//!
//! The engine never logs through a process-wide default; it receives a
//! [`RunLogger`] at construction. [`TracingLogger`] forwards to `tracing`,
//! [`LogBroadcaster`] streams events to subscribers.

pub mod broadcaster;
pub mod subscriber;

pub use broadcaster::{LogBroadcaster, LogEvent};
pub use subscriber::{init_tracing, LoggingError};

/// Log sink injected into the engine. Never affects control flow.
pub trait RunLogger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards run messages to `tracing` under the `paramsync` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RunLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "paramsync", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "paramsync", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "paramsync", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "paramsync", "{}", message);
    }
}
