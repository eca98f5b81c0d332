//! # Input History
//!
//! Bounded list of previously entered lines with a navigation cursor.
//!
//! The cursor ranges over `0..=len`. The `len` position is the "live" edit
//! buffer: the user is not browsing history. `previous()` walks towards the
//! oldest entry and stops there; `next()` walks back towards live and stays
//! there once reached.
//!
//! ```text
//!   lines:   [ "a", "b", "c" ]   cursor = 3 (live)
//!   previous() -> "c"            cursor = 2
//!   previous() -> "b"            cursor = 1
//!   next()     -> "c"            cursor = 2
//!   next()     -> ""             cursor = 3 (live)
//! ```

use std::collections::VecDeque;

/// Default number of remembered input lines.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    cursor: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Creates an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the cursor sits on the live edit position.
    pub fn is_live(&self) -> bool {
        self.cursor == self.lines.len()
    }

    /// Stores a non-empty line, evicting the oldest at capacity.
    /// The cursor is reset to live either way.
    pub fn push(&mut self, line: &str) {
        if !line.is_empty() {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line.to_string());
        }
        self.reset_cursor();
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.lines.len();
    }

    /// Steps towards older entries, flooring at the oldest.
    /// Returns `""` when the history is empty.
    pub fn previous(&mut self) -> &str {
        if self.lines.is_empty() {
            self.cursor = 0;
            return "";
        }
        self.cursor = self.cursor.saturating_sub(1);
        &self.lines[self.cursor]
    }

    /// Steps towards the live position. Past the newest entry this snaps to
    /// live and returns `""`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &str {
        if self.cursor + 1 >= self.lines.len() {
            self.cursor = self.lines.len();
            return "";
        }
        self.cursor += 1;
        &self.lines[self.cursor]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
