//! Thread id to navigation target, and back.

use std::sync::LazyLock;

use regex::Regex;

static THREAD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/c/([0-9a-fA-F-]+)").expect("valid regex pattern"));

/// Whether a caller-supplied thread id is safe to splice into a URL path.
pub fn is_valid_thread_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Maps external thread ids onto chat URLs.
#[derive(Debug, Clone)]
pub struct ThreadResolver {
    base_url: String,
}

impl ThreadResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/c/<id>` when continuing a thread, the bare base otherwise.
    pub fn navigation_target(&self, thread_id: Option<&str>) -> String {
        match thread_id {
            Some(id) if !id.is_empty() => format!("{}/c/{}", self.base_url, id),
            _ => self.base_url.clone(),
        }
    }

    /// Recover the thread id from the tab's location after submission.
    ///
    /// `None` means the id could not be determined, not that something failed.
    pub fn resolve(&self, location: &str) -> Option<String> {
        THREAD_PATH
            .captures(location)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}
