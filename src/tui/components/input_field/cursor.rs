//! Cursor position and horizontal scrolling for the InputField.
//!
//! `CursorState` owns the cursor byte offset and the horizontal scroll
//! offset. All methods take `buffer: &str` explicitly; the text itself is
//! owned by `InputField`.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// Display columns scrolled off the left edge
    pub scroll: usize,
}

impl CursorState {
    pub fn new() -> Self {
        Self { pos: 0, scroll: 0 }
    }

    /// Reset cursor to start (used after the buffer is cleared).
    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll = 0;
    }

    /// Place the cursor after the last character.
    pub fn to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
    }

    pub fn move_left(&mut self, buffer: &str) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos = prev_char_boundary(buffer, self.pos);
        true
    }

    pub fn move_right(&mut self, buffer: &str) -> bool {
        if self.pos >= buffer.len() {
            return false;
        }
        self.pos = next_char_boundary(buffer, self.pos);
        true
    }

    /// Display column of the cursor within the whole buffer.
    pub fn column(&self, buffer: &str) -> usize {
        buffer[..self.pos].width()
    }

    /// Adjust the scroll so the cursor stays inside a `width`-column viewport.
    pub fn update_scroll(&mut self, buffer: &str, width: usize) {
        if width == 0 {
            self.scroll = 0;
            return;
        }
        let column = self.column(buffer);
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + width {
            self.scroll = column + 1 - width;
        }
        self.scroll = snap_to_char_start(buffer, self.scroll);
    }

    /// The slice of `buffer` visible through the current scroll window.
    pub fn visible_text(&self, buffer: &str, width: usize) -> String {
        let mut column = 0;
        let mut visible = String::new();
        let mut used = 0;
        for c in buffer.chars() {
            let w = c.width().unwrap_or(0);
            if column >= self.scroll {
                if used + w > width {
                    break;
                }
                visible.push(c);
                used += w;
            }
            column += w;
        }
        visible
    }
}

/// First character start column at or after `column`. A scroll offset inside
/// a wide character would hide it while the cursor still counts its columns.
fn snap_to_char_start(buffer: &str, column: usize) -> usize {
    let mut start = 0;
    for c in buffer.chars() {
        if start >= column {
            return start;
        }
        start += c.width().unwrap_or(0);
    }
    start.max(column)
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
