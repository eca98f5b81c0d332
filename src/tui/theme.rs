//! Fixed palette: normal, error, and one accent each for our own and other
//! people's messages. Header and caption use reversed video.

use ratatui::style::{Color, Modifier, Style};

use crate::core::chat_log::LineStyle;

pub fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Normal => Style::default().fg(Color::Gray).bg(Color::Black),
        LineStyle::Error => Style::default().fg(Color::LightRed).bg(Color::Black),
        LineStyle::HighlightSelf => Style::default().fg(Color::Green).bg(Color::Black),
        LineStyle::HighlightOther => Style::default().fg(Color::LightBlue).bg(Color::Black),
    }
}

/// Header and caption bars.
pub fn reversed() -> Style {
    Style::default().fg(Color::Black).bg(Color::Gray)
}

/// The input line.
pub fn input() -> Style {
    line_style(LineStyle::Normal)
}

/// Overlay for the focused log line while the log pane has focus.
pub fn focused_line() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
