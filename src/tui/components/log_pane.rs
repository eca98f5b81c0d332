//! # LogPane Component
//!
//! Scrollable view of the shared chat log.
//!
//! ## Responsibilities
//!
//! - Wrap each log line to the pane width
//! - Keep the focused line on screen, pinning to the bottom while following
//! - Move the log focus on keyboard and wheel navigation
//! - Hit testing for pointer clicks
//!
//! ## Architecture
//!
//! The lines live in a [`SharedLog`] that the background receive task appends
//! to. Every render takes the lock once and reads the lines, the focus and the
//! follow flag under it, so an append can never land between measuring and
//! drawing. Line heights are rebuilt from scratch each frame: evictions shift
//! every index, so a positional cache would be invalid after almost any append.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::chat_log::{LineStyle, SharedLog};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme;

/// High-level events emitted by the LogPane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    /// A pointer click landed on the pane
    FocusGained,
    /// The focused log line changed
    FocusMoved,
}

pub struct LogPane {
    log: SharedLog,
    /// Whether the pane holds keyboard focus (Prop)
    pub focused: bool,
    scroll_state: ScrollViewState,
    layout: LineLayout,
    /// Area from the last render, for hit testing and paging
    last_area: Rect,
}

impl LogPane {
    pub fn new(log: SharedLog) -> Self {
        Self {
            log,
            focused: false,
            scroll_state: ScrollViewState::default(),
            layout: LineLayout::default(),
            last_area: Rect::default(),
        }
    }

    /// Whether lines exist below the focused one, i.e. the view is not
    /// following the tail.
    pub fn has_unseen_content(&self) -> bool {
        !self.log.lock().is_following()
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.last_area.contains(Position::new(column, row))
    }

    fn page(&self) -> isize {
        self.last_area.height.max(1) as isize
    }

    fn click(&mut self, row: u16) -> LogEvent {
        let y = row - self.last_area.y + self.scroll_state.offset().y;
        if let Some(index) = self.layout.line_at(y) {
            self.log.lock().focus_at(index);
        }
        LogEvent::FocusGained
    }
}

impl Component for LogPane {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_area = area;
        frame.render_widget(Block::default().style(theme::line_style(LineStyle::Normal)), area);
        if area.is_empty() {
            return;
        }
        // -1 for the scrollbar
        let content_width = area.width.saturating_sub(1).max(1);

        let log = self.log.lock();
        self.layout
            .rebuild(log.view().map(|line| line.text.as_str()), content_width);

        let total = self.layout.total();
        let max_y = total.saturating_sub(area.height);
        let offset = if log.is_following() {
            max_y
        } else {
            let current = self.scroll_state.offset().y;
            log.focus()
                .map(|focus| self.layout.scroll_to_show(focus, current, area.height))
                .unwrap_or(current)
                .min(max_y)
        };
        self.scroll_state.set_offset(Position { x: 0, y: offset });

        let mut scroll_view = ScrollView::new(Size::new(content_width, total))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for index in self.layout.visible_range(offset, area.height) {
            let Some(line) = log.get(index) else {
                continue;
            };
            let mut style = theme::line_style(line.style);
            if self.focused && log.focus() == Some(index) {
                style = style.patch(theme::focused_line());
            }
            let rows: Vec<Line> = wrap(&line.text, content_width)
                .into_iter()
                .map(Line::from)
                .collect();
            let rect = Rect::new(
                0,
                self.layout.top(index),
                content_width,
                self.layout.heights[index],
            );
            scroll_view.render_widget(Paragraph::new(rows).style(style), rect);
        }
        drop(log);

        frame.render_stateful_widget(scroll_view, area, &mut self.scroll_state);
    }
}

impl EventHandler for LogPane {
    type Event = LogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::CursorUp | TuiEvent::ScrollUp => self.log.lock().focus_previous(),
            TuiEvent::CursorDown | TuiEvent::ScrollDown => self.log.lock().focus_next(),
            TuiEvent::PageUp => {
                let page = self.page();
                self.log.lock().focus_by(-page);
            }
            TuiEvent::PageDown => {
                let page = self.page();
                self.log.lock().focus_by(page);
            }
            TuiEvent::CursorHome => self.log.lock().focus_first(),
            TuiEvent::CursorEnd => self.log.lock().focus_last(),
            TuiEvent::MouseClick(column, row) if self.contains(*column, *row) => {
                return Some(self.click(*row));
            }
            _ => return None,
        }
        Some(LogEvent::FocusMoved)
    }
}

/// Wraps one log line to `width` columns. An empty line still takes a row.
fn wrap(text: &str, width: u16) -> Vec<String> {
    let options = textwrap::Options::new(width as usize).break_words(true);
    let rows: Vec<String> = textwrap::wrap(text, options)
        .into_iter()
        .map(|row| row.into_owned())
        .collect();
    if rows.is_empty() { vec![String::new()] } else { rows }
}

/// Row heights of the wrapped log lines, measured for one frame.
#[derive(Debug, Default)]
struct LineLayout {
    heights: Vec<u16>,
    /// Running bottom edge of each line
    prefix_heights: Vec<u16>,
}

impl LineLayout {
    fn rebuild<'a>(&mut self, lines: impl Iterator<Item = &'a str>, width: u16) {
        self.heights.clear();
        self.heights
            .extend(lines.map(|text| wrap(text, width).len().min(u16::MAX as usize) as u16));
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    fn total(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    fn top(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        }
    }

    /// Index of the line covering canvas row `y`.
    fn line_at(&self, y: u16) -> Option<usize> {
        let index = self.prefix_heights.partition_point(|&end| end <= y);
        (index < self.prefix_heights.len()).then_some(index)
    }

    /// Smallest scroll change from `offset` that shows line `index` whole.
    /// A line taller than the viewport is aligned at its top.
    fn scroll_to_show(&self, index: usize, offset: u16, viewport_height: u16) -> u16 {
        if index >= self.prefix_heights.len() {
            return offset;
        }
        let top = self.top(index);
        let bottom = self.prefix_heights[index];
        if top < offset {
            top
        } else if bottom > offset.saturating_add(viewport_height) {
            bottom.saturating_sub(viewport_height).min(top)
        } else {
            offset
        }
    }

    fn visible_range(&self, offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let end_y = offset.saturating_add(viewport_height);
        let start = self.prefix_heights.partition_point(|&end| end <= offset);
        let end = self.prefix_heights.partition_point(|&end| end < end_y);
        start..(end + 1).min(self.prefix_heights.len())
    }
}
