//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::chat_log::Redraw;
use crate::core::store::{ChatStore, PersistenceError};
use crate::net::{ByteReceiver, LineSender, TransportError};

/// Records every sent line. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingSender {
    /// A sender whose every send fails with a broken pipe.
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.fail_sends();
        sender
    }

    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl LineSender for RecordingSender {
    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Send(io::Error::from(io::ErrorKind::BrokenPipe)));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Plays back a fixed list of reads, then reports end-of-stream.
pub struct ScriptedReceiver {
    reads: VecDeque<Result<Vec<u8>, TransportError>>,
}

impl ScriptedReceiver {
    pub fn new(reads: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            reads: reads.into(),
        }
    }
}

impl ByteReceiver for ScriptedReceiver {
    fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        self.reads.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// In-memory chat store. `None` history behaves like a missing file.
#[derive(Clone, Default)]
pub struct MemoryStore {
    history: Option<Vec<String>>,
    appended: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn with_history(lines: &[&str]) -> Self {
        Self {
            history: Some(lines.iter().map(|l| l.to_string()).collect()),
            ..Self::default()
        }
    }

    /// A store whose appends always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.appended.lock().unwrap().clone()
    }
}

impl ChatStore for MemoryStore {
    fn replay(&self) -> Result<Option<Vec<String>>, PersistenceError> {
        Ok(self.history.clone())
    }

    fn append_line(&mut self, line: &str) -> Result<(), PersistenceError> {
        if self.fail {
            return Err(PersistenceError {
                path: "memory".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.appended.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

/// Counts redraw requests.
#[derive(Default)]
pub struct CountingRedraw {
    count: AtomicUsize,
}

impl CountingRedraw {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Redraw for CountingRedraw {
    fn request_redraw(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
