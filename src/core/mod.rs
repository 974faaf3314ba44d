// Core modules implementing the escaper and error modeling.
pub mod error;
pub mod escape;
