//! # TUI Components
//!
//! This module contains the widgets that make up the chat screen.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as fields:
//! - `TitleBar`: Top bar with identity, room and the "new lines" marker
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `LogPane`: Scrollable view over the shared chat log
//! - `InputField`: Single-line entry with line history
//!
//! Neither stateful component knows about the view that composes it. Both
//! report an implicit focus change (a pointer click landing on them) as a
//! `FocusGained` event; `ChatView` routes it to its `FocusObserver`.
//!
//! ## Co-location of Concerns
//!
//! Each component file contains everything related to that component:
//! - State types
//! - Event types
//! - Rendering logic
//! - Event handling
//! - Tests
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top bar)
//! ├── log_pane.rs      (Scrollable chat log)
//! └── input_field/     (Single-line input with history)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_field;
pub use input_field::{InputEvent, InputField};
pub mod log_pane;
pub use log_pane::{LogEvent, LogPane};
