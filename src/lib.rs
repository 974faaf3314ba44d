//! Purpose: Library crate behind the `jsonsafe` CLI and its tests.
//! Exports: `api` (escaper and errors).
//! Role: Pure transforms live here; the binary adds IO, framing, output and diagnostics.
//! Invariants: Core functions are total and free of hidden state.
pub mod api;
mod core;
