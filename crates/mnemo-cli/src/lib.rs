//! Mnemo CLI library.
//!
//! Argument parsing and the handlers behind the `mnemo` binary.

pub mod cli;
pub mod commands;
