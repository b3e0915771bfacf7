//! Session login state and the email/password login flow.

use std::time::Duration;

use chatrelay_config::{Config, LoginConfig};
use tracing::info;

use crate::error::CoreError;
use crate::page::ChatPage;

const LOGIN_BUTTON: &str = "Log in";
const CONTINUE_BUTTON: &str = "Continue";
const EMAIL_INPUT: &str = r#"input[name="email"]"#;
const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

const FORM_WAIT: Duration = Duration::from_secs(30);
const REDIRECT_SETTLE: Duration = Duration::from_secs(3);
const EDITOR_WAIT: Duration = Duration::from_secs(60);

/// Email and password for the credential flow.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_config(config: &LoginConfig) -> Option<Self> {
        config.credentials().map(|(email, password)| Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// The editor is present and no "Log in" control is offered.
pub async fn is_logged_in(page: &dyn ChatPage, editor_selector: &str) -> Result<bool, CoreError> {
    Ok(page.exists(editor_selector).await? && !page.has_button(LOGIN_BUTTON).await?)
}

/// Make sure the browser session is logged in, running the credential flow
/// when it is not.
pub async fn perform_login(
    page: &dyn ChatPage,
    config: &Config,
    credentials: Option<&Credentials>,
) -> Result<(), CoreError> {
    let editor = &config.selectors.editor;

    page.goto(
        &config.chat.base_url,
        Duration::from_secs(config.chat.navigation_timeout_secs),
    )
    .await?;
    tokio::time::sleep(REDIRECT_SETTLE).await;

    if is_logged_in(page, editor).await? {
        info!("Browser session already logged in");
        return Ok(());
    }

    let credentials = credentials.ok_or_else(|| {
        CoreError::LoginFailed("session is logged out and no credentials are configured".to_string())
    })?;

    info!(email = %credentials.email, "Logging in with credentials");
    if !page.click_button(LOGIN_BUTTON).await? {
        return Err(CoreError::LoginFailed("no \"Log in\" control on the page".to_string()));
    }

    require(page, EMAIL_INPUT, FORM_WAIT).await?;
    page.fill(EMAIL_INPUT, &credentials.email).await?;
    page.click(SUBMIT_BUTTON).await?;

    require(page, PASSWORD_INPUT, FORM_WAIT).await?;
    page.fill(PASSWORD_INPUT, &credentials.password).await?;
    if !page.click_button(CONTINUE_BUTTON).await? {
        return Err(CoreError::LoginFailed("no \"Continue\" control on the password form".to_string()));
    }

    if !page.wait_for(editor, EDITOR_WAIT).await? {
        return Err(CoreError::LoginFailed(format!(
            "editor did not appear after login (at {})",
            page.location().await?
        )));
    }

    info!("Login flow complete");
    Ok(())
}

async fn require(page: &dyn ChatPage, selector: &str, timeout: Duration) -> Result<(), CoreError> {
    if page.wait_for(selector, timeout).await? {
        Ok(())
    } else {
        Err(CoreError::ElementNotFound {
            selector: selector.to_string(),
            location: page.location().await?,
        })
    }
}
