//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command output handling with consistent error text
//! - `io` - File I/O with consistent error handling

pub mod command;
pub mod io;
