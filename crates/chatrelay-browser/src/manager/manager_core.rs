//! BrowserManager core: Chrome discovery, launch, connection and cookies.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chatrelay_config::BrowserConfig;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cdp::{CdpClient, CookieParam};

use super::BrowserError;

const LAUNCH_POLL: Duration = Duration::from_millis(200);

/// Manages the shared browser connection.
pub struct BrowserManager {
    pub(super) config: BrowserConfig,
    /// Held across connect so concurrent callers share one attempt.
    pub(super) client: Mutex<Option<Arc<CdpClient>>>,
    /// Chrome process handle (if we launched it).
    pub(super) chrome_process: Mutex<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
            chrome_process: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Find the Chrome executable, preferring the configured one.
    pub fn find_chrome(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.executable {
            return path.exists().then(|| path.clone());
        }

        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: [&str; 0] = [];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Command-line flags for a launched Chrome.
    pub(super) fn launch_args(&self) -> Vec<String> {
        let profile_dir = self.config.resolved_profile_dir();
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", profile_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--no-sandbox".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!(
                "--window-size={},{}",
                self.config.window_width, self.config.window_height
            ),
            format!("--user-agent={}", self.config.user_agent),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        args
    }

    /// Check if Chrome is already running on the debug port.
    pub(super) async fn is_chrome_running(&self) -> bool {
        reqwest::get(&format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    /// Launch Chrome with remote debugging enabled.
    pub(super) async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = self.find_chrome().ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = self.config.resolved_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let child = Command::new(&chrome_path)
            .args(self.launch_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    async fn wait_for_launch(&self) -> Result<(), BrowserError> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.launch_timeout_secs);
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(LAUNCH_POLL).await;
            if self.is_chrome_running().await {
                return Ok(());
            }
        }
        Err(BrowserError::LaunchFailed(format!(
            "Chrome did not expose port {} within {}s",
            self.config.debug_port, self.config.launch_timeout_secs
        )))
    }

    /// The live CDP client, connecting (and launching Chrome) when needed.
    ///
    /// A dropped connection is replaced on the next call.
    pub async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            if client.is_connected() {
                return Ok(client.clone());
            }
            warn!("Browser connection lost, reconnecting");
        }

        let client = Arc::new(self.connect().await?);
        *guard = Some(client.clone());
        Ok(client)
    }

    async fn connect(&self) -> Result<CdpClient, BrowserError> {
        if !self.is_chrome_running().await {
            info!("Chrome not running on port {}, launching...", self.config.debug_port);
            let child = self.launch_chrome().await?;
            *self.chrome_process.lock().await = Some(child);
            self.wait_for_launch().await?;
        } else {
            info!("Chrome already running on port {}", self.config.debug_port);
        }

        let client = CdpClient::connect(&self.config.endpoint()).await?;
        info!(
            browser = client.browser_version(),
            "Connected to Chrome at {}",
            self.config.endpoint()
        );

        if let Some(raw) = self.config.cookies_json.as_deref() {
            match parse_cookies(raw) {
                Ok(cookies) => apply_cookies(&client, cookies).await?,
                Err(e) => warn!("Skipping cookie injection: {}", e),
            }
        }

        Ok(client)
    }

    /// Connect eagerly. Used at startup so the first request is not slow.
    pub async fn ensure_connected(&self) -> Result<(), BrowserError> {
        self.client().await.map(|_| ())
    }

    /// Drop the browser connection.
    pub async fn close(&self) -> Result<(), BrowserError> {
        let _ = self.client.lock().await.take();
        info!("Browser connection closed");
        Ok(())
    }

    /// Close the connection and kill Chrome if we launched it.
    pub async fn shutdown(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
        Ok(())
    }
}

/// Parse a JSON array of exported cookies.
pub(super) fn parse_cookies(raw: &str) -> Result<Vec<CookieParam>, BrowserError> {
    let cookies: Vec<CookieParam> =
        serde_json::from_str(raw).map_err(|e| BrowserError::InvalidCookies(e.to_string()))?;
    Ok(cookies.into_iter().map(CookieParam::normalized).collect())
}

/// `Network.setCookies` is page-scoped, so a throwaway tab carries the call.
async fn apply_cookies(client: &CdpClient, cookies: Vec<CookieParam>) -> Result<(), BrowserError> {
    if cookies.is_empty() {
        return Ok(());
    }
    let count = cookies.len();
    let payload =
        serde_json::to_value(&cookies).map_err(|e| BrowserError::InvalidCookies(e.to_string()))?;

    let session = client.new_page(None).await?;
    let result = session.set_cookies(payload).await;
    if let Err(e) = client.close_page(&session).await {
        debug!("Failed to close cookie tab: {}", e);
    }
    result?;

    info!("Injected {} cookies", count);
    Ok(())
}
