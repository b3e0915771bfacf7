//! Browser process and session configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the Chrome instance backing the session is launched and reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chrome executable. Searched in the usual install locations when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Persistent profile directory (keeps the logged-in session between runs).
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// JSON array of cookies injected into the browser after connecting.
    #[serde(default)]
    pub cookies_json: Option<String>,

    /// Seconds to wait for a freshly launched Chrome to expose its debugging endpoint.
    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: default_headless(),
            executable: None,
            profile_dir: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            cookies_json: None,
            launch_timeout_secs: default_launch_timeout(),
        }
    }
}

impl BrowserConfig {
    /// The CDP HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// The profile directory, defaulting to `~/.chatrelay/chrome-profile`.
    pub fn resolved_profile_dir(&self) -> PathBuf {
        match &self.profile_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".chatrelay")
                .join("chrome-profile"),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    540
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_launch_timeout() -> u64 {
    10
}

/// Credentials for the email/password login flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl LoginConfig {
    /// Both credentials, when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}
