//! Execution log records

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an execution log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A single log line attached to an execution and, optionally, one of its steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Set for lines scoped to a step execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            step_id: None,
        }
    }

    pub fn for_step(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = Some(step_id.into());
        self
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message
        )
    }
}

/// Hands out timestamps that never go backwards, even if the wall clock does.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_format() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let entry = LogEntry::new(ts, LogLevel::Error, "Step 2 failed");
        assert_eq!(
            entry.to_string(),
            "[2026-03-01T12:30:00.000Z] [ERROR] Step 2 failed"
        );
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&LogLevel::Info).unwrap();
        assert_eq!(json, "\"INFO\"");
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut clock = MonotonicClock::new();
        let future = Utc::now() + chrono::Duration::seconds(60);
        clock.last = Some(future);
        assert_eq!(clock.now(), future);

        let mut clock = MonotonicClock::new();
        let mut prev = clock.now();
        for _ in 0..100 {
            let next = clock.now();
            assert!(next >= prev);
            prev = next;
        }
    }
}
