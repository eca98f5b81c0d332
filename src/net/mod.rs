//! # Network Transport
//!
//! The chat connection as two independent halves: a [`LineSender`] driven by
//! the UI loop and a [`ByteReceiver`] driven by the background receive task.
//! The session only sees the traits, so tests swap in scripted doubles.

pub mod connection;

pub use connection::{
    ByteReceiver, LineSender, TcpByteReceiver, TcpConnection, TcpLineSender, TransportError,
};
