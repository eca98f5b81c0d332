//! # ChatView
//!
//! The one screen of the client:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [alice] GitChat @github.com/acme/widgets     │  header (reversed)
//! ├──────────────────────────────────────────────┤
//! │ [bob]: morning                               │
//! │ [alice]: hi                                  │  LogPane
//! │ ...                                          │
//! ├──────────────────────────────────────────────┤
//! │ Command: (Tab to switch focus to upper ...)  │  caption (reversed)
//! │ Type exit or quit to close                   │
//! ├──────────────────────────────────────────────┤
//! │ > _                                          │  InputField
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Owns the focus between the log and the input. Tab switches it; every other
//! key goes to whichever pane holds it. Wheel events always scroll the log.

use std::sync::Arc;

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;

use crate::core::chat_log::{LineStyle, OutputHandle, Redraw, SharedLog};
use crate::tui::component::{Component, EventHandler, FocusObserver, Pane};
use crate::tui::components::{InputEvent, InputField, LogEvent, LogPane, TitleBar};
use crate::tui::event::TuiEvent;
use crate::tui::theme;

pub const CAPTION: &str =
    "Command: (Tab to switch focus to upper frame, where you can scroll text)\nType exit or quit to close";

/// Header text for a user in a repository room.
pub fn title_for(username: &str, repo_uri: &str) -> String {
    format!("[{username}] GitChat @{repo_uri}")
}

/// High-level events emitted by the ChatView
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The user entered a line in the input field
    LineEntered(String),
}

pub struct ChatView {
    title: TitleBar,
    log: LogPane,
    input: InputField,
    focus: Pane,
    output: OutputHandle,
}

impl ChatView {
    /// Builds the view. Must be called on the thread that runs the render
    /// loop: output from any other thread is treated as asynchronous.
    pub fn new(
        title: String,
        log: SharedLog,
        history_capacity: usize,
        redraw: Arc<dyn Redraw>,
    ) -> Self {
        let mut view = Self {
            title: TitleBar::new(title),
            log: LogPane::new(log.clone()),
            input: InputField::new(history_capacity),
            focus: Pane::Input,
            output: OutputHandle::new(log, redraw),
        };
        view.set_focus(Pane::Input);
        view
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn switch_focus(&mut self) {
        self.set_focus(self.focus.other());
    }

    fn set_focus(&mut self, pane: Pane) {
        if pane != self.focus {
            debug!("Focus {:?} -> {:?}", self.focus, pane);
        }
        self.focus = pane;
        // Only the focused pane shows a cursor or a highlighted line
        self.log.focused = pane == Pane::Log;
        self.input.focused = pane == Pane::Input;
    }

    /// Appends a line to the log, requesting a redraw when called off the
    /// render thread.
    pub fn output(&self, text: impl Into<String>, style: LineStyle) {
        self.output.output(text, style);
    }

    /// A cloneable handle for appending from other tasks.
    pub fn output_handle(&self) -> OutputHandle {
        self.output.clone()
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    fn handle_click(&mut self, event: &TuiEvent) -> Option<ViewEvent> {
        if let Some(LogEvent::FocusGained) = self.log.handle_event(event) {
            self.on_focus_gained(Pane::Log);
        } else if let Some(InputEvent::FocusGained) = self.input.handle_event(event) {
            self.on_focus_gained(Pane::Input);
        }
        None
    }
}

impl FocusObserver for ChatView {
    fn on_focus_gained(&mut self, pane: Pane) {
        self.set_focus(pane);
    }
}

impl Component for ChatView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};
        let layout = Layout::vertical([Length(1), Min(0), Length(2), Length(1)]);
        let [header_area, log_area, caption_area, input_area] = layout.areas(area);

        self.log.render(frame, log_area);
        self.title.has_unseen_content = self.log.has_unseen_content();
        self.title.render(frame, header_area);
        frame.render_widget(Paragraph::new(CAPTION).style(theme::reversed()), caption_area);
        self.input.render(frame, input_area);
    }
}

impl EventHandler for ChatView {
    type Event = ViewEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Tab => {
                self.switch_focus();
                None
            }
            TuiEvent::ScrollUp | TuiEvent::ScrollDown => {
                self.log.handle_event(event);
                None
            }
            TuiEvent::MouseClick(..) => self.handle_click(event),
            _ => match self.focus {
                Pane::Input => match self.input.handle_event(event) {
                    Some(InputEvent::LineEntered(line)) => Some(ViewEvent::LineEntered(line)),
                    _ => None,
                },
                Pane::Log => {
                    self.log.handle_event(event);
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingRedraw;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn view_with(log: SharedLog) -> (ChatView, Arc<CountingRedraw>) {
        let redraw = Arc::new(CountingRedraw::default());
        let view = ChatView::new(title_for("alice", "repo"), log, 10, redraw.clone());
        (view, redraw)
    }

    fn screen(view: &mut ChatView, width: u16, height: u16) -> Vec<String> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_initial_focus_is_input() {
        let (view, _) = view_with(SharedLog::new(10));
        assert_eq!(view.focus(), Pane::Input);
    }

    #[test]
    fn test_tab_toggles_focus() {
        let (mut view, _) = view_with(SharedLog::new(10));
        view.handle_event(&TuiEvent::Tab);
        assert_eq!(view.focus(), Pane::Log);
        view.handle_event(&TuiEvent::Tab);
        assert_eq!(view.focus(), Pane::Input);
    }

    #[test]
    fn test_keys_go_to_focused_pane() {
        let log = SharedLog::new(10);
        for i in 0..5 {
            log.append(crate::core::chat_log::DisplayLine::new(
                format!("line {i}"),
                LineStyle::Normal,
            ));
        }
        let (mut view, _) = view_with(log.clone());

        view.handle_event(&TuiEvent::InputChar('h'));
        view.handle_event(&TuiEvent::CursorUp);
        // Up in the input walks (empty) history, not the log
        assert_eq!(log.lock().focus(), Some(4));

        view.switch_focus();
        view.handle_event(&TuiEvent::CursorUp);
        assert_eq!(log.lock().focus(), Some(3));
        view.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(view.input().buffer, "");
    }

    #[test]
    fn test_enter_emits_line() {
        let (mut view, _) = view_with(SharedLog::new(10));
        for c in "hi there".chars() {
            view.handle_event(&TuiEvent::InputChar(c));
        }
        assert_eq!(
            view.handle_event(&TuiEvent::Submit),
            Some(ViewEvent::LineEntered("hi there".to_string()))
        );
        assert_eq!(view.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_click_moves_focus() {
        let log = SharedLog::new(10);
        log.append(crate::core::chat_log::DisplayLine::new("a", LineStyle::Normal));
        let (mut view, _) = view_with(log);
        screen(&mut view, 40, 10);

        // Row 1 is the first log row
        view.handle_event(&TuiEvent::MouseClick(3, 1));
        assert_eq!(view.focus(), Pane::Log);

        // Row 9 is the input line
        view.handle_event(&TuiEvent::MouseClick(3, 9));
        assert_eq!(view.focus(), Pane::Input);

        // Header click changes nothing
        view.handle_event(&TuiEvent::MouseClick(3, 0));
        assert_eq!(view.focus(), Pane::Input);
    }

    #[test]
    fn test_wheel_scrolls_log_without_focus_change() {
        let log = SharedLog::new(10);
        for text in ["a", "b", "c"] {
            log.append(crate::core::chat_log::DisplayLine::new(text, LineStyle::Normal));
        }
        let (mut view, _) = view_with(log.clone());

        view.handle_event(&TuiEvent::ScrollUp);
        assert_eq!(log.lock().focus(), Some(1));
        assert_eq!(view.focus(), Pane::Input);
    }

    #[test]
    fn test_output_from_render_thread_needs_no_redraw() {
        let (view, redraw) = view_with(SharedLog::new(10));
        view.output("local", LineStyle::Normal);
        assert_eq!(redraw.count(), 0);
    }

    #[test]
    fn test_output_from_background_requests_redraw() {
        let log = SharedLog::new(10);
        let (view, redraw) = view_with(log.clone());
        let handle = view.output_handle();

        std::thread::spawn(move || handle.output("remote", LineStyle::HighlightOther))
            .join()
            .unwrap();

        assert_eq!(redraw.count(), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_render_layout() {
        let log = SharedLog::new(10);
        log.append(crate::core::chat_log::DisplayLine::new(
            "[bob]: morning",
            LineStyle::HighlightOther,
        ));
        let (mut view, _) = view_with(log);

        let rows = screen(&mut view, 80, 8);
        assert!(rows[0].starts_with("[alice] GitChat @repo"));
        assert!(rows[1].starts_with("[bob]: morning"));
        assert!(rows[5].starts_with("Command: (Tab to switch focus"));
        assert!(rows[6].starts_with("Type exit or quit to close"));
        assert!(rows[7].starts_with("> "));
    }
}
