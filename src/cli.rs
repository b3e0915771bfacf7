//! CLI definitions for chatrelay.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// chatrelay CLI.
#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(about = "Drive a chat assistant web UI through Chrome and serve it over HTTP")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Server host (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Development mode: no API key checks, detailed errors
    #[arg(long, env = "CHATRELAY_DEV", global = true)]
    pub dev: bool,

    /// API key expected from clients (overrides config)
    #[arg(long, env = "CHATRELAY_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP server in foreground (default)
    Serve,

    /// Send one prompt and print the result as JSON
    Prompt {
        /// Prompt text
        text: String,

        /// Continue an existing conversation
        #[arg(long)]
        thread: Option<String>,

        /// Deep reasoning mode (longer poll budgets)
        #[arg(long)]
        reason: bool,

        /// Search mode
        #[arg(long)]
        search: bool,

        /// System-level instruction prepended to the prompt
        #[arg(long)]
        system: Option<String>,

        /// Image to attach (http(s) URL or base64 data URL); repeatable
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },

    /// Check the browser session and log in with configured credentials if needed
    Login,
}
