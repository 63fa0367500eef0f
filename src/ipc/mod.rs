//! IPC listener that accepts commands over a Unix socket.
//!
//! A presentation layer, a script, or a key-bind helper connects to the
//! socket and sends newline-delimited JSON commands.

pub mod listener;
