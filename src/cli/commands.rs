//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - decode: dispatch event frames through the chat decoders
//! - encode: turn a chat event into an event frame
//! - events: list handled event names and variants

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sioc - Inspect Socket.IO event frames with typed codecs
#[derive(Parser, Debug)]
#[command(name = "sioc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode newline-delimited event frames
    Decode {
        /// Frame file to read (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Encode a chat event given as JSON, e.g. '{"type":"join","room":"lobby"}'
    Encode {
        /// Chat event JSON
        event: String,

        /// Request an ack from the receiver
        #[arg(short, long)]
        ack: bool,
    },

    /// List the event names and variants the codecs handle
    Events,
}
