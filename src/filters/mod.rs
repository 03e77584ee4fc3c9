//! Bundled filters
//!
//! `core` describes the built-in opcodes; `text` and `file` are ordinary
//! handler-backed filters registered through the same table as any
//! third-party filter would be.

pub mod core;
pub mod file;
pub mod text;
