//! Tracing setup, component wiring and the `serve` command.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use chatrelay_api::{ApiServer, AppState, ListenConfig};
use chatrelay_browser::BrowserManager;
use chatrelay_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use chatrelay_core::{Credentials, Orchestrator, PromptService};

/// Initialize tracing with console output and, when configured, a daily
/// rolling log file.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.dir {
        Some(dir) => {
            let log_dir = ConfigLoader::expand_path(&dir.to_string_lossy());
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&logging.file_prefix)
                .filename_suffix("log")
                .max_log_files(logging.max_files)
                .build(&log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keeps the background writer alive for the program duration.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Validate the configuration, logging warnings and failing on errors.
pub(crate) fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config)?.into_result()?;
    for warning in warnings {
        warn!(field = %warning.path, "{}", warning.message);
    }
    Ok(())
}

/// The browser session and the prompt service on top of it.
pub(crate) struct Relay {
    pub browser: Arc<BrowserManager>,
    pub service: Arc<PromptService>,
}

impl Relay {
    pub(crate) fn new(config: &Config) -> Self {
        let browser = Arc::new(BrowserManager::new(config.browser.clone()));
        let service = Arc::new(PromptService::new(
            browser.clone(),
            Orchestrator::new(config),
        ));
        Self { browser, service }
    }

    /// Connect to Chrome and make sure the web UI session is logged in.
    pub(crate) async fn start(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        self.browser.ensure_connected().await?;
        let credentials = Credentials::from_config(&config.login);
        self.service.login(config, credentials.as_ref()).await?;
        Ok(())
    }

    pub(crate) async fn stop(&self) {
        if let Err(e) = self.browser.shutdown().await {
            warn!("Browser shutdown failed: {}", e);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server in foreground.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting chatrelay v{}", env!("CARGO_PKG_VERSION"));
    check_config(&config)?;
    if config.server.dev_mode {
        warn!("Development mode: API key checks are disabled");
    }

    let relay = Relay::new(&config);
    relay.start(&config).await?;
    info!("Browser session ready at {}", config.chat.base_url);

    let state = Arc::new(AppState::new(relay.service.clone(), &config));
    let server = ApiServer::new(
        ListenConfig::new(config.server.host.clone(), config.server.port),
        state,
    );
    let result = server.run(shutdown_signal()).await;

    relay.stop().await;
    info!("chatrelay stopped");
    result
}
