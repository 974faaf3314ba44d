//! Purpose: Define the public Rust API boundary for jsonsafe.
//! Exports: Escaper entrypoints plus the error types used by the CLI.
//! Role: Additive-only surface; internal module layout stays private.
//! Invariants: This module is the only public path to core functionality.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::escape::{
    Input, SUBSTITUTIONS, escape_text, to_json_safe, to_json_safe_nested,
};
