//! CLI module for Syssel.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Syssel - Natural-Language Task Assistant
///
/// Manage your task list by chatting with an LLM-backed agent.
/// The name "Syssel" comes from the Norwegian word for "chore."
#[derive(Parser, Debug)]
#[command(name = "syssel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session with the task assistant
    Chat {
        /// Bearer token for the task backend (skips sign-in)
        #[arg(short, long, env = "SYSSEL_TOKEN")]
        token: Option<String>,

        /// Email to sign in with (prompts for password)
        #[arg(short, long)]
        email: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start the HTTP API server (/chat and /call_tool)
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create an account on the task backend
    Signup {
        /// Email address for the new account
        email: String,
    },

    /// Sign in and print a bearer token
    Signin {
        /// Email address of the account
        email: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "agent.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
