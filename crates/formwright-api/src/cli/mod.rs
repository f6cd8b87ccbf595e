//! CLI command definitions for the `fwright` binary.
//!
//! Uses clap derive macros for argument parsing. Library management lives
//! under `fwright form <action>`; `fwright build` opens the interactive
//! builder.

pub mod builder;
pub mod form;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Build, reorder and manage form schemas.
#[derive(Parser)]
#[command(name = "fwright", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "FORMWRIGHT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage saved forms (list, show, delete, publish, duplicate, export, import).
    Form {
        #[command(subcommand)]
        action: form::FormCommand,
    },

    /// Open the interactive form builder.
    Build {
        /// Edit an existing form instead of starting a blank one.
        #[arg(long, value_name = "FORM_ID")]
        edit: Option<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `[server] port` in config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `[server] host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
