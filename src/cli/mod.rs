//! Command-line interface module.
//!
//! Provides argument parsing and the non-interactive subcommands.

pub mod args;
pub mod commands;
