//! # InputField Component
//!
//! Single-line command entry at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture text input and paste
//! - Handle editing (backspace, delete, cursor movement)
//! - Handle submission (Enter), emitting the trimmed line
//! - Walk the entered-line history with Up/Down
//!
//! ## State Management
//!
//! The edit buffer and the `HistoryBuffer` are internal state, touched only by
//! the foreground loop. Whether the field has keyboard focus is a prop set by
//! `ChatView`. Cursor position and horizontal scroll live in `CursorState`.

mod cursor;

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::widgets::Paragraph;

use crate::core::history::HistoryBuffer;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme;

use cursor::{CursorState, next_char_boundary};

const PROMPT: &str = "> ";

/// High-level events emitted by the InputField
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A non-blank line was entered; carries the trimmed text
    LineEntered(String),
    /// A pointer click landed on the field
    FocusGained,
    /// Buffer or cursor changed
    ContentChanged,
}

pub struct InputField {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Whether the field holds keyboard focus (Prop)
    pub focused: bool,
    history: HistoryBuffer,
    cursor: CursorState,
    /// Area from the last render, for click hit testing
    last_area: Rect,
}

impl InputField {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            buffer: String::new(),
            focused: true,
            history: HistoryBuffer::new(history_capacity),
            cursor: CursorState::new(),
            last_area: Rect::default(),
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Whether a screen position falls inside the last rendered area.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.last_area.contains(Position::new(column, row))
    }

    fn replace_buffer(&mut self, text: String) {
        self.buffer = text;
        self.cursor.to_end(&self.buffer);
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
    }

    fn submit(&mut self) -> Option<InputEvent> {
        let line = self.buffer.trim().to_string();
        self.buffer.clear();
        self.cursor.reset();
        if line.is_empty() {
            self.history.reset_cursor();
            return Some(InputEvent::ContentChanged);
        }
        // push also returns the history cursor to live
        self.history.push(&line);
        Some(InputEvent::LineEntered(line))
    }
}

impl Component for InputField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_area = area;
        let prompt_width = PROMPT.len() as u16;
        let text_width = area.width.saturating_sub(prompt_width) as usize;

        self.cursor.update_scroll(&self.buffer, text_width);
        let visible = self.cursor.visible_text(&self.buffer, text_width);

        let line = Paragraph::new(format!("{PROMPT}{visible}")).style(theme::input());
        frame.render_widget(line, area);

        if self.focused {
            let column = (self.cursor.column(&self.buffer) - self.cursor.scroll) as u16;
            let x = (area.x + prompt_width + column).min(area.right().saturating_sub(1));
            frame.set_cursor_position((x, area.y));
        }
    }
}

impl EventHandler for InputField {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line field: pasted line breaks become spaces
                let flattened: String = text
                    .chars()
                    .filter(|c| *c != '\r')
                    .map(|c| if c == '\n' { ' ' } else { c })
                    .collect();
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                let end = self.cursor.pos;
                self.cursor.move_left(&self.buffer).then(|| {
                    self.buffer.drain(self.cursor.pos..end);
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => self
                .cursor
                .move_left(&self.buffer)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorRight => self
                .cursor
                .move_right(&self.buffer)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorHome => (self.cursor.pos != 0).then(|| {
                self.cursor.pos = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor.pos != self.buffer.len()).then(|| {
                self.cursor.to_end(&self.buffer);
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => self.submit(),
            TuiEvent::CursorUp => {
                let text = self.history.previous().to_string();
                self.replace_buffer(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorDown => {
                let text = self.history.next().to_string();
                self.replace_buffer(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::MouseClick(column, row) if self.contains(*column, *row) => {
                Some(InputEvent::FocusGained)
            }
            _ => None,
        }
    }
}
