//! Capped, most-recent-first log.

use std::collections::VecDeque;

use chrono::Local;

/// Timestamped log lines, newest first, bounded in length.
#[derive(Debug, Clone)]
pub struct LogPanel {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogPanel {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend `[HH:MM:SS] message`, dropping the oldest line past capacity.
    pub fn push(&mut self, message: &str) {
        let line = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        self.lines.push_front(line);
        self.lines.truncate(self.capacity);
    }

    /// Lines, newest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn newest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }
}
