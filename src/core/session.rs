//! # Client Session
//!
//! Ties the connection to the chat view. Two activities run side by side:
//!
//! ```text
//!   UI loop (main thread)                    receive task (blocking worker)
//!   ─────────────────────                    ──────────────────────────────
//!   InputField ─LineEntered─► submit()       replay_history()
//!                               │            loop {
//!                               ▼              receive() ─► frame lines
//!                         LineSender             ─► store.append_line()
//!                                                ─► OutputHandle::output()
//!                                            } ─► SessionEvent
//! ```
//!
//! The session itself only owns the send half and the lifecycle state:
//!
//! ```text
//! Connecting ──handshake──► Active ──quit / fatal error──► Terminating ──close──► Closed
//! ```

use std::sync::mpsc;

use log::{debug, error, info, warn};

use crate::core::chat_log::{LineStyle, OutputHandle};
use crate::core::store::ChatStore;
use crate::core::wire::{self, Identity, LineFramer};
use crate::net::{ByteReceiver, LineSender, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Terminating,
    Closed,
}

/// What a submitted line turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Sent to the server as a chat message.
    Sent,
    /// `exit`/`quit`: farewell sent, connection closed, UI loop should stop.
    Quit,
    /// Blank line, or the session is no longer active.
    Ignored,
}

/// Messages from the receive task to the UI loop.
#[derive(Debug)]
pub enum SessionEvent {
    /// Output arrived from outside the UI thread; draw now.
    Redraw,
    /// The server closed the stream.
    RemoteClosed,
    /// Reading failed; the session cannot continue.
    ConnectionLost(TransportError),
}

/// How the receive loop ended.
#[derive(Debug)]
pub enum ReceiveEnd {
    EndOfStream,
    Failed(TransportError),
}

pub struct ClientSession {
    sender: Box<dyn LineSender>,
    identity: Identity,
    state: SessionState,
}

impl ClientSession {
    pub fn new(sender: Box<dyn LineSender>, identity: Identity) -> Self {
        Self {
            sender,
            identity,
            state: SessionState::Connecting,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Announces this user and repository to the server.
    pub fn handshake(&mut self) -> Result<(), TransportError> {
        if self.state != SessionState::Connecting {
            warn!("Handshake requested in state {:?}", self.state);
            return Ok(());
        }
        match self.sender.send(&wire::greeting(&self.identity)) {
            Ok(()) => {
                info!(
                    "Session active as {} on {}",
                    self.identity.username, self.identity.repo_uri
                );
                self.state = SessionState::Active;
                Ok(())
            }
            Err(e) => {
                error!("Handshake failed: {}", e);
                self.state = SessionState::Terminating;
                Err(e)
            }
        }
    }

    /// Handles a line the user entered.
    ///
    /// `exit` and `quit` (exact, after trimming) end the session. A failed
    /// farewell is only logged since the user is leaving anyway; a failed
    /// chat send terminates the session and is returned.
    pub fn submit(&mut self, line: &str) -> Result<Submitted, TransportError> {
        if self.state != SessionState::Active {
            warn!("Dropping input in state {:?}", self.state);
            return Ok(Submitted::Ignored);
        }

        let text = line.trim();
        if text.is_empty() {
            return Ok(Submitted::Ignored);
        }

        if wire::is_quit_command(text) {
            info!("User requested quit");
            self.state = SessionState::Terminating;
            if let Err(e) = self.sender.send(&wire::farewell(&self.identity)) {
                warn!("Failed to send farewell: {}", e);
            }
            if let Err(e) = self.sender.close() {
                warn!("Failed to close connection: {}", e);
            }
            return Ok(Submitted::Quit);
        }

        match self.sender.send(&wire::chat_message(&self.identity, text)) {
            Ok(()) => {
                debug!("Sent message ({} bytes)", text.len());
                Ok(Submitted::Sent)
            }
            Err(e) => {
                error!("Send failed: {}", e);
                self.state = SessionState::Terminating;
                Err(e)
            }
        }
    }

    /// The receive path hit a fatal error.
    pub fn fail(&mut self) {
        if matches!(self.state, SessionState::Connecting | SessionState::Active) {
            self.state = SessionState::Terminating;
        }
    }

    /// Closes the connection once the UI loop has stopped.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Err(e) = self.sender.close() {
            warn!("Failed to close connection: {}", e);
        }
        self.state = SessionState::Closed;
        info!("Session closed");
    }
}

/// Outputs every stored line, tagged self/other. Returns how many were shown.
///
/// No store file means no history. Any other read failure is logged and the
/// chat carries on without history.
pub fn replay_history(store: &dyn ChatStore, identity: &Identity, output: &OutputHandle) -> usize {
    match store.replay() {
        Ok(Some(lines)) => {
            for line in &lines {
                output.output(line.as_str(), wire::style_for(line, identity));
            }
            info!("Replayed {} stored lines", lines.len());
            lines.len()
        }
        Ok(None) => {
            debug!("No stored chat history");
            0
        }
        Err(e) => {
            warn!("Could not replay chat history: {}", e);
            0
        }
    }
}

/// Routes complete inbound lines to the store and the chat view.
struct Delivery<'a, 's> {
    identity: &'a Identity,
    output: &'a OutputHandle,
    store: Option<&'a mut (dyn ChatStore + 's)>,
}

impl Delivery<'_, '_> {
    fn deliver(&mut self, raw: &str) {
        let text = match wire::strip_route_token(raw, &self.identity.repo_uri) {
            Ok(text) => text,
            Err(malformed) => {
                debug!("{}", malformed);
                raw.trim_end()
            }
        };
        if text.trim().is_empty() {
            return;
        }

        if let Some(store) = self.store.as_deref_mut()
            && let Err(e) = store.append_line(text)
        {
            warn!("Failed to persist chat line: {}", e);
        }

        self.output.output(text, wire::style_for(text, self.identity));
    }
}

/// Reads until the stream ends or fails, delivering lines in arrival order.
pub fn receive_loop(
    receiver: &mut dyn ByteReceiver,
    store: Option<&mut (dyn ChatStore + '_)>,
    identity: &Identity,
    output: &OutputHandle,
) -> ReceiveEnd {
    let mut framer = LineFramer::new();
    let mut delivery = Delivery {
        identity,
        output,
        store,
    };

    loop {
        match receiver.receive() {
            Ok(chunk) if chunk.is_empty() => {
                if let Some(rest) = framer.finish() {
                    delivery.deliver(&rest);
                }
                info!("Server closed the connection");
                output.output("Connection closed by server.", LineStyle::Normal);
                return ReceiveEnd::EndOfStream;
            }
            Ok(chunk) => {
                debug!("Received {} bytes", chunk.len());
                for line in framer.push(&chunk) {
                    delivery.deliver(&line);
                }
            }
            Err(e) => {
                error!("Receive failed: {}", e);
                output.output(format!("Error: {e}"), LineStyle::Error);
                return ReceiveEnd::Failed(e);
            }
        }
    }
}

/// Starts the one background receive task.
///
/// It runs on tokio's blocking pool since `receive()` blocks. Nothing joins
/// or cancels it: the runtime is shut down without waiting, so a read that
/// never returns does not hold up process exit.
pub fn spawn_receive_task(
    mut receiver: Box<dyn ByteReceiver>,
    mut store: Option<Box<dyn ChatStore>>,
    identity: Identity,
    output: OutputHandle,
    events: mpsc::Sender<SessionEvent>,
) -> tokio::task::JoinHandle<()> {
    info!("Spawning receive task");
    tokio::task::spawn_blocking(move || {
        if let Some(store) = store.as_deref() {
            replay_history(store, &identity, &output);
        }

        let end = receive_loop(receiver.as_mut(), store.as_deref_mut(), &identity, &output);
        let event = match end {
            ReceiveEnd::EndOfStream => SessionEvent::RemoteClosed,
            ReceiveEnd::Failed(e) => SessionEvent::ConnectionLost(e),
        };
        if events.send(event).is_err() {
            debug!("Receive task finished after the UI loop exited");
        }
    })
}
