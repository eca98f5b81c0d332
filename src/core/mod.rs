//! # Core Chat Logic
//!
//! Everything GitChat knows about chatting, independent of how it is drawn.
//! It knows nothing about ratatui or crossterm.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ScrollingLog (lock)  │
//!                    │  • HistoryBuffer        │
//!                    │  • ClientSession        │
//!                    │  • wire format / store  │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │    NET     │
//!            │ (ratatui)  │            │   (TCP)    │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`chat_log`]: the shared chat log and the cross-thread output handle
//! - [`history`]: input line history
//! - [`session`]: session lifecycle, submit path, receive task
//! - [`wire`]: message formats and line framing
//! - [`store`]: persisted chat lines
//! - [`config`]: settings and their override hierarchy

pub mod config;
pub mod history;
pub mod chat_log;
pub mod session;
pub mod store;
pub mod wire;
