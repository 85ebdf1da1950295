use core::fmt;
use std::collections::VecDeque;
use tracing::{Level, event};

pub const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Append-only public event log. Keeps the newest `capacity` entries.
#[derive(Debug, Clone)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl GameLog {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(LOG_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        event!(target: "clue_core::engine", Level::DEBUG, "{text}");
        self.entries.push_back(LogEntry { text });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GameLog {
    fn default() -> Self {
        Self::new()
    }
}
