//! # Wire Format
//!
//! The chat server speaks newline-delimited text. Every outbound message
//! carries the repository URI as a routing token:
//!
//! ```text
//! first <repo> <user>            greeting on connect
//! [<user>]: <text> <repo>        chat message
//! exit <user> <repo>             graceful quit
//! ```
//!
//! Inbound lines are relayed chat messages; the trailing `<repo>` token is
//! stripped before display and storage. The newline itself is framing and is
//! added by the transport, not here.

use std::fmt;

use crate::core::chat_log::LineStyle;

/// Who we are on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub repo_uri: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, repo_uri: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            repo_uri: repo_uri.into(),
        }
    }

    /// The first token of every message this user authored.
    pub fn sender_tag(&self) -> String {
        format!("[{}]:", self.username)
    }
}

pub fn greeting(identity: &Identity) -> String {
    format!("first {} {}", identity.repo_uri, identity.username)
}

pub fn chat_message(identity: &Identity, text: &str) -> String {
    format!("[{}]: {} {}", identity.username, text, identity.repo_uri)
}

pub fn farewell(identity: &Identity) -> String {
    format!("exit {} {}", identity.username, identity.repo_uri)
}

/// `exit` and `quit` end the session; nothing else does.
pub fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

/// An inbound line that lacks the routing token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMessage {
    pub raw: String,
}

impl fmt::Display for MalformedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed message (no routing token): {:?}", self.raw)
    }
}

impl std::error::Error for MalformedMessage {}

/// Strips the trailing ` <repo>` routing token from an inbound line.
pub fn strip_route_token<'a>(line: &'a str, repo_uri: &str) -> Result<&'a str, MalformedMessage> {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix(repo_uri) {
        Some(rest) if !repo_uri.is_empty() && (rest.is_empty() || rest.ends_with(' ')) => {
            Ok(rest.trim_end())
        }
        _ => Err(MalformedMessage {
            raw: line.to_string(),
        }),
    }
}

/// True when the first token of `line` is exactly `[<username>]:`.
///
/// A substring test would tag `[bob]:` as ours for user `bo`; only an exact
/// token match counts.
pub fn is_self_authored(line: &str, identity: &Identity) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token == identity.sender_tag())
}

/// Palette slot for a chat line: ours in one accent, everyone else's in the other.
pub fn style_for(line: &str, identity: &Identity) -> LineStyle {
    if is_self_authored(line, identity) {
        LineStyle::HighlightSelf
    } else {
        LineStyle::HighlightOther
    }
}

/// Reassembles newline-delimited lines from arbitrary read chunks.
///
/// A read may end mid-line (or mid-character); the fragment is held until
/// the rest arrives so lines are emitted whole and in order.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }

    /// Drains whatever partial line is left (on end-of-stream).
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
