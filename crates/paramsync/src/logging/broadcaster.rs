//! Log broadcasting for real-time streaming of run logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::RunLogger;

const TARGET: &str = "paramsync";

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: &str, target: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEvent>,
}

impl LogBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn send(&self, event: LogEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.sender.subscribe()
    }

    pub fn log(&self, level: &str, message: &str) {
        self.send(LogEvent::new(level, TARGET, message));
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl RunLogger for LogBroadcaster {
    fn info(&self, message: &str) {
        self.log("INFO", message);
    }

    fn debug(&self, message: &str) {
        self.log("DEBUG", message);
    }

    fn warn(&self, message: &str) {
        self.log("WARN", message);
    }

    fn error(&self, message: &str) {
        self.log("ERROR", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_events() {
        let broadcaster = LogBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        broadcaster.info("Saved parameter /app/a");
        broadcaster.error("Failed to save parameter /app/b");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, "INFO");
        assert_eq!(first.target, "paramsync");
        assert_eq!(first.message, "Saved parameter /app/a");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, "ERROR");
    }

    #[test]
    fn test_send_without_receivers() {
        let broadcaster = LogBroadcaster::default();
        broadcaster.warn("nobody is listening");
    }
}
