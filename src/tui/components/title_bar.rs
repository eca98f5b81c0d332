//! # TitleBar Component
//!
//! Single reversed line across the top: who you are and which repository
//! room you are in, plus a "↓ New" marker while new lines arrive below the
//! part of the log you are reading.
//!
//! Purely presentational. All fields are props set by the parent.

use crate::tui::component::Component;
use crate::tui::theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

pub struct TitleBar {
    /// Static header text, e.g. `[alice] GitChat @github.com/acme/widgets`
    pub title: String,
    /// Whether the log has lines below the focused one
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(title: String) -> Self {
        Self {
            title,
            has_unseen_content: false,
        }
    }

    fn text(&self) -> String {
        if self.has_unseen_content {
            format!("{} | ↓ New", self.title)
        } else {
            self.title.clone()
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Pad to full width so the reversed style spans the whole row
        let text = format!("{:<width$}", self.text(), width = area.width as usize);
        frame.render_widget(Span::styled(text, theme::reversed()), area);
    }
}
