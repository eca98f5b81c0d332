//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the chat view,
//! and feeds entered lines to the [`ClientSession`].
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The loop only draws when something changed:
//!
//! - A terminal event (key, paste, mouse, resize) marks the frame dirty.
//! - Output appended from the receive task sends [`SessionEvent::Redraw`]
//!   over the session channel, which the loop drains every poll interval.
//!
//! Output appended on this thread needs no message: it always happens while
//! handling an event, which already marks the frame dirty.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic.

pub mod chat_view;
mod component;
pub mod components;
pub mod event;
mod theme;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::core::chat_log::{LineStyle, Redraw, SharedLog};
use crate::core::config::ResolvedConfig;
use crate::core::session::{ClientSession, SessionEvent, Submitted, spawn_receive_task};
use crate::core::store::ChatStore;
use crate::net::{ByteReceiver, TransportError};
use crate::tui::chat_view::{ChatView, ViewEvent, title_for};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// How often the loop checks the session channel when no key arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why the UI loop stopped.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The user typed `exit`/`quit` or pressed Ctrl+C.
    Quit,
    /// The server closed the connection.
    RemoteClosed,
    /// Sending or receiving failed.
    Failed(TransportError),
}

impl SessionOutcome {
    /// Whether the process should exit with status 0.
    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Quit | SessionOutcome::RemoteClosed)
    }
}

/// Turns redraw requests from the receive task into loop wakeups.
struct ChannelRedraw(mpsc::Sender<SessionEvent>);

impl Redraw for ChannelRedraw {
    fn request_redraw(&self) {
        if self.0.send(SessionEvent::Redraw).is_err() {
            debug!("Redraw requested after the UI loop exited");
        }
    }
}

struct TerminalModeGuard {
    mouse: bool,
}

impl TerminalModeGuard {
    fn new(mouse: bool) -> io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset on redraws
        )?;
        // Mouse capture disables the terminal's own text selection, so it is opt-in
        if mouse {
            execute!(stdout(), EnableMouseCapture)?;
        }
        info!("Terminal modes enabled (bracketed paste, mouse: {})", mouse);
        Ok(Self { mouse })
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        if self.mouse {
            let _ = execute!(stdout(), DisableMouseCapture);
        }
        let _ = execute!(stdout(), DisableBracketedPaste, Hide);
    }
}

/// Runs the chat screen until the user quits or the connection ends.
///
/// `session` must already be active. The receive task is started here, after
/// the view exists, so every line it outputs lands in this view's log.
pub fn run(
    config: &ResolvedConfig,
    mut session: ClientSession,
    receiver: Box<dyn ByteReceiver>,
    store: Option<Box<dyn ChatStore>>,
) -> io::Result<SessionOutcome> {
    let (tx, rx) = mpsc::channel();
    let identity = session.identity().clone();

    let redraw: Arc<dyn Redraw> = Arc::new(ChannelRedraw(tx.clone()));
    let mut view = ChatView::new(
        title_for(&identity.username, &identity.repo_uri),
        SharedLog::new(config.log_capacity),
        config.history_capacity,
        redraw,
    );

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new(config.mouse);
    if let Err(e) = &terminal_mode_guard {
        warn!("Failed to set terminal modes: {}", e);
    }

    // Detached: the runtime is shut down without waiting for it
    let _receive_task = spawn_receive_task(receiver, store, identity, view.output_handle(), tx);

    let result = event_loop(&mut terminal, &mut view, &mut session, &rx);

    session.close();
    drop(terminal_mode_guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    view: &mut ChatView,
    session: &mut ClientSession,
    rx: &mpsc::Receiver<SessionEvent>,
) -> io::Result<SessionOutcome> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| view.render(f, f.area()))?;
            needs_redraw = false;
        }

        // Process first event + drain ALL pending events before next draw
        let mut pending = poll_event_timeout(POLL_INTERVAL)?;
        while let Some(event) = pending {
            needs_redraw = true;
            if let Some(outcome) = handle_event(&event, view, session) {
                terminal.draw(|f| view.render(f, f.area()))?;
                return Ok(outcome);
            }
            pending = poll_event_immediate()?;
        }

        let (redraw, outcome) = drain_session_events(rx, session);
        needs_redraw |= redraw;
        if let Some(outcome) = outcome {
            // Show the closing line the receive task just output
            terminal.draw(|f| view.render(f, f.area()))?;
            return Ok(outcome);
        }
    }
}

/// Empties the session channel. Returns whether a redraw was requested, and
/// the outcome once the receive task has ended, after moving the session to
/// `Terminating`.
fn drain_session_events(
    rx: &mpsc::Receiver<SessionEvent>,
    session: &mut ClientSession,
) -> (bool, Option<SessionOutcome>) {
    let mut redraw = false;
    while let Ok(event) = rx.try_recv() {
        let outcome = match event {
            SessionEvent::Redraw => {
                redraw = true;
                continue;
            }
            SessionEvent::RemoteClosed => SessionOutcome::RemoteClosed,
            SessionEvent::ConnectionLost(e) => SessionOutcome::Failed(e),
        };
        info!("Receive task ended: {:?}", outcome);
        session.fail();
        return (redraw, Some(outcome));
    }
    (redraw, None)
}

/// Applies one terminal event. Returns the outcome when the loop should stop.
fn handle_event(
    event: &TuiEvent,
    view: &mut ChatView,
    session: &mut ClientSession,
) -> Option<SessionOutcome> {
    let line = match event {
        // Resize just needs a redraw (already flagged)
        TuiEvent::Resize => return None,
        TuiEvent::ForceQuit => "quit".to_string(),
        _ => match view.handle_event(event)? {
            ViewEvent::LineEntered(line) => line,
        },
    };

    match session.submit(&line) {
        Ok(Submitted::Quit) => Some(SessionOutcome::Quit),
        Ok(Submitted::Sent | Submitted::Ignored) => None,
        Err(e) => {
            view.output(format!("Error: {e}"), LineStyle::Error);
            Some(SessionOutcome::Failed(e))
        }
    }
}
