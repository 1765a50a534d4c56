//! CLI module for sioc - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for decoding and encoding
//! event frames against the bundled chat protocol.

pub mod chat;
pub mod commands;
pub mod frame;

pub use commands::Cli;
