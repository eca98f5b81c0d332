//! # Scrolling Log
//!
//! The chat display model: a bounded ring of [`DisplayLine`]s plus a focus
//! index that follows the tail while the user is reading the newest lines.
//!
//! ```text
//!  append(x) with focus on the last line       append(x) while scrolled up
//!  ┌───┬───┬───┐        ┌───┬───┬───┬───┐      ┌───┬───┬───┐     ┌───┬───┬───┬───┐
//!  │ a │ b │ c*│   →    │ a │ b │ c │ x*│      │ a*│ b │ c │  →  │ a*│ b │ c │ x │
//!  └───┴───┴───┘        └───┴───┴───┴───┘      └───┴───┴───┘     └───┴───┴───┴───┘
//! ```
//!
//! ## Sharing
//!
//! The render loop and the background receive task both touch the log, so it
//! lives behind a single mutex ([`SharedLog`]). The eviction, the append and
//! the follow-tail decision happen under one guard, which is what keeps a
//! renderer from observing a half-evicted ring.
//!
//! Other threads never append directly; they go through [`OutputHandle`],
//! which appends and then asks the render loop for an explicit redraw.

use std::collections::VecDeque;
use std::collections::vec_deque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Default number of lines kept on screen.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Fixed palette slot for a displayed line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Normal,
    Error,
    HighlightSelf,
    HighlightOther,
}

/// One immutable line of chat output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub style: LineStyle,
}

impl DisplayLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug)]
pub struct ScrollingLog {
    lines: VecDeque<DisplayLine>,
    capacity: usize,
    /// Index of the focused line; `None` only while the log is empty.
    focus: Option<usize>,
}

impl Default for ScrollingLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl ScrollingLog {
    /// Creates an empty log. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
            focus: None,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// True when the focus is on the newest line (or there are no lines),
    /// i.e. the next append will be followed.
    pub fn is_following(&self) -> bool {
        match self.focus {
            Some(index) => index + 1 == self.lines.len(),
            None => true,
        }
    }

    /// Appends a line, evicting the oldest when full.
    ///
    /// If the focus was on the last line before the append it moves to the
    /// new last line; otherwise the focus index is left as it was.
    pub fn append(&mut self, line: DisplayLine) {
        let was_at_end = self.is_following();

        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);

        if was_at_end {
            self.focus = Some(self.lines.len() - 1);
        }
    }

    /// Lazy, restartable view over the current lines, oldest first.
    pub fn view(&self) -> vec_deque::Iter<'_, DisplayLine> {
        self.lines.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DisplayLine> {
        self.lines.get(index)
    }

    pub fn focus_previous(&mut self) {
        self.focus_by(-1);
    }

    pub fn focus_next(&mut self) {
        self.focus_by(1);
    }

    /// Moves the focus by `delta` lines, clamped to the log bounds.
    pub fn focus_by(&mut self, delta: isize) {
        let Some(current) = self.focus else {
            return;
        };
        let last = self.lines.len() - 1;
        let target = current.saturating_add_signed(delta).min(last);
        self.focus = Some(target);
    }

    /// Focuses the line at `index`, clamped to the last line.
    pub fn focus_at(&mut self, index: usize) {
        if !self.lines.is_empty() {
            self.focus = Some(index.min(self.lines.len() - 1));
        }
    }

    pub fn focus_first(&mut self) {
        if !self.lines.is_empty() {
            self.focus = Some(0);
        }
    }

    /// Re-attaches the focus to the newest line so appends are followed again.
    pub fn focus_last(&mut self) {
        if !self.lines.is_empty() {
            self.focus = Some(self.lines.len() - 1);
        }
    }
}

/// The one lock around the scrolling log.
#[derive(Debug, Clone, Default)]
pub struct SharedLog(Arc<Mutex<ScrollingLog>>);

impl SharedLog {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(ScrollingLog::new(capacity))))
    }

    /// Locks the log for a read or a mutation.
    ///
    /// A poisoned lock is recovered: every operation on the log leaves it
    /// consistent, so a panic elsewhere cannot leave it torn.
    pub fn lock(&self) -> MutexGuard<'_, ScrollingLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, line: DisplayLine) {
        self.lock().append(line);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the current lines out of the lock.
    pub fn snapshot(&self) -> Vec<DisplayLine> {
        self.lock().view().cloned().collect()
    }
}

/// Asks the render loop to draw the screen now.
pub trait Redraw: Send + Sync {
    fn request_redraw(&self);
}

/// Cloneable output endpoint for the chat log.
///
/// Created on the render thread. Output from that thread is picked up by the
/// loop's normal redraw; output from any other thread additionally issues
/// exactly one [`Redraw::request_redraw`].
#[derive(Clone)]
pub struct OutputHandle {
    log: SharedLog,
    redraw: Arc<dyn Redraw>,
    render_thread: ThreadId,
}

impl OutputHandle {
    /// Binds the handle to the calling thread as the render thread.
    pub fn new(log: SharedLog, redraw: Arc<dyn Redraw>) -> Self {
        Self {
            log,
            redraw,
            render_thread: thread::current().id(),
        }
    }

    pub fn output(&self, text: impl Into<String>, style: LineStyle) {
        self.log.append(DisplayLine::new(text, style));

        // The lock is released before asking for a redraw: the render loop
        // takes it again to draw.
        if !self.on_render_thread() {
            self.redraw.request_redraw();
        }
    }

    pub fn on_render_thread(&self) -> bool {
        thread::current().id() == self.render_thread
    }

    pub fn log(&self) -> &SharedLog {
        &self.log
    }
}
