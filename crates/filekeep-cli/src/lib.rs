//! # filekeep-cli
//!
//! Command-line front end over the FileKeep service layer. The binary
//! loads configuration and logging, opens a [`CliContext`] over the
//! snapshot-backed record store, and dispatches one [`Cli`] command.

pub mod commands;
pub mod context;
pub mod output;

pub use commands::Cli;
pub use context::CliContext;
