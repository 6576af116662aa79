//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agos - flood risk over SMS for Philippine locations
#[derive(Parser)]
#[command(name = "agos", about = "SMS flood-risk assistant for Philippine locations", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive conversation loop (local stand-in for the SMS channel)
    Chat,

    /// One-shot risk assessment for a location
    Assess {
        /// Free-form location text, e.g. "Marikina" or "Brgy Lahug, Cebu"
        location: String,

        /// Print the reply wrapped in a TwiML envelope
        #[arg(long)]
        twiml: bool,
    },

    /// Resolve a location to coordinates without assessing
    Resolve {
        /// Free-form location text
        location: String,
    },
}
