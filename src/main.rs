//! chatrelay - relay prompts to a chat assistant web UI.
//!
//! Main entry point for the chatrelay CLI and server.

mod cli;
mod cmd_prompt;
mod server;

use clap::Parser;

use chatrelay_config::{Config, ConfigLoader};

use crate::cli::{Cli, Commands};
use crate::cmd_prompt::{run_login, run_prompt, PromptArgs};
use crate::server::{init_tracing, run_server};

/// Apply command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.dev {
        config.server.dev_mode = true;
    }
    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.is_empty()) {
        config.auth.api_key = Some(key.clone());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    apply_overrides(&mut config, &cli);

    init_tracing(&config.logging)?;

    match cli.command {
        None | Some(Commands::Serve) => run_server(config).await,
        Some(Commands::Prompt {
            text,
            thread,
            reason,
            search,
            system,
            attachments,
        }) => {
            let args = PromptArgs {
                text,
                thread,
                reason,
                search,
                system,
                attachments,
            };
            run_prompt(config, args).await
        }
        Some(Commands::Login) => run_login(config).await,
    }
}
