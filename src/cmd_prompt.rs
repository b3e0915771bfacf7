//! One-shot `prompt` and `login` commands.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chatrelay_config::Config;
use chatrelay_core::{
    is_valid_thread_id, Attachment, PromptOptions, PromptRequest, PromptRunner,
};

use crate::server::{check_config, Relay};

/// Arguments of the `prompt` subcommand.
pub(crate) struct PromptArgs {
    pub text: String,
    pub thread: Option<String>,
    pub reason: bool,
    pub search: bool,
    pub system: Option<String>,
    pub attachments: Vec<String>,
}

impl PromptArgs {
    pub(crate) fn into_request(self) -> Result<PromptRequest, String> {
        if let Some(thread) = self.thread.as_deref() {
            if !is_valid_thread_id(thread) {
                return Err(format!("invalid thread id: {}", thread));
            }
        }
        let attachments = self
            .attachments
            .iter()
            .map(|r| Attachment::parse(r).ok_or_else(|| format!("unsupported attachment: {}", r)))
            .collect::<Result<Vec<_>, _>>()?;

        let options = PromptOptions {
            reason: self.reason,
            search: self.search,
            thread_id: None,
        }
        .with_thread_id(self.thread);

        Ok(PromptRequest::new(self.text)
            .with_system_prompt(self.system)
            .with_options(options)
            .with_attachments(attachments))
    }
}

/// Send one prompt and print the result as JSON. Ctrl+C cancels it.
pub(crate) async fn run_prompt(
    config: Config,
    mut args: PromptArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    check_config(&config)?;
    if args.system.is_none() {
        args.system = config.chat.default_system_prompt.clone();
    }
    let request = args.into_request()?;

    let relay = Relay::new(&config);
    if let Err(e) = relay.start(&config).await {
        relay.stop().await;
        return Err(e);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling prompt");
            on_interrupt.cancel();
        }
    });

    let result = relay.service.run(request, cancel).await;
    relay.stop().await;

    let result = result?;
    info!(outcome = result.outcome.label(), "Prompt finished");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Check the session and log in if needed.
pub(crate) async fn run_login(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    check_config(&config)?;
    let relay = Relay::new(&config);
    let result = relay.start(&config).await;
    relay.stop().await;
    result?;
    println!("Logged in to {}", config.chat.base_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PromptArgs {
        PromptArgs {
            text: "Name 3 primary colors.".to_string(),
            thread: None,
            reason: false,
            search: true,
            system: Some("Be brief".to_string()),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_into_request() {
        let request = args().into_request().unwrap();
        assert_eq!(request.composed_prompt(), "Be brief | Prompt: Name 3 primary colors.");
        assert!(request.options.search);
        assert!(request.options.thread_id.is_none());
    }

    #[test]
    fn test_into_request_rejects_bad_thread() {
        let mut bad = args();
        bad.thread = Some("a/b".to_string());
        assert!(bad.into_request().is_err());
    }

    #[test]
    fn test_into_request_parses_attachments() {
        let mut with_files = args();
        with_files.attachments = vec!["https://example.com/x.png".to_string()];
        assert_eq!(with_files.into_request().unwrap().attachments.len(), 1);

        let mut bad = args();
        bad.attachments = vec!["/etc/passwd".to_string()];
        assert!(bad.into_request().is_err());
    }
}
