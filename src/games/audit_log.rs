use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Entries kept by a session log
pub const AUDIT_LOG_CAPACITY: usize = 10;

/// Kind of audit log entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Status,
    Success,
    Error,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Status => write!(f, "STATUS"),
            LogKind::Success => write!(f, "SUCCESS"),
            LogKind::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
    /// Game label for results (`MINES (C:3)`), empty for status lines
    pub label: String,
    pub message: String,
    /// Position in the session's history, starting at 1
    pub sequence: u64,
}

impl AuditLogEntry {
    /// Console timestamp, `HH:MM:SS.mmm`
    pub fn clock(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}

impl fmt::Display for AuditLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}]", self.clock(), self.kind)?;
        if !self.label.is_empty() {
            write!(f, " {}", self.label)?;
        }
        write!(f, " {}", self.message)
    }
}

/// Bounded history, newest first
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditLogEntry>,
    capacity: usize,
    next_sequence: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(AUDIT_LOG_CAPACITY)
    }

    /// Log holding at most `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 1,
        }
    }

    /// Prepend an entry, evicting the oldest past capacity
    pub fn record(&mut self, kind: LogKind, label: impl Into<String>, message: impl Into<String>) -> &AuditLogEntry {
        let entry = AuditLogEntry {
            timestamp: Utc::now(),
            kind,
            label: label.into(),
            message: message.into(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Snapshot, newest first
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&AuditLogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let mut log = AuditLog::new();
        for i in 0..15 {
            log.record(LogKind::Status, "", format!("run {}", i));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), AUDIT_LOG_CAPACITY);
        assert_eq!(entries[0].message, "run 14");
        assert_eq!(entries[9].message, "run 5");
        assert_eq!(entries[0].sequence, 15);
        assert!(entries.windows(2).all(|w| w[0].sequence > w[1].sequence));
    }

    #[test]
    fn test_entry_display() {
        let mut log = AuditLog::with_capacity(2);
        let entry = log.record(LogKind::Success, "DICE", "ROLLED: 8.5700").clone();

        let clock = entry.clock();
        assert_eq!(clock.len(), "00:00:00.000".len());
        assert_eq!(entry.to_string(), format!("[{}] [SUCCESS] DICE ROLLED: 8.5700", clock));
        assert_eq!(log.latest(), Some(&entry));
    }

    #[test]
    fn test_zero_capacity_keeps_latest_entry() {
        let mut log = AuditLog::with_capacity(0);
        log.record(LogKind::Status, "", "first");
        let latest = log.record(LogKind::Error, "DICE", "second").clone();

        assert_eq!(latest.message, "second");
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest(), Some(&latest));
    }

    #[test]
    fn test_empty_log() {
        let log = AuditLog::default();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
