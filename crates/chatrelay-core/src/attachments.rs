//! Image attachments: parsing references and materializing them on disk.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::debug;

use crate::error::CoreError;

/// An image reference carried by a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    /// `http(s)://` URL, downloaded before upload.
    Remote { url: String },
    /// `data:<media type>;base64,<payload>` URI, decoded before upload.
    Inline { media_type: String, data: String },
}

impl Attachment {
    /// Parse a URL or base64 data URI. `None` for anything else.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, data) = rest.split_once(',')?;
            let media_type = meta.strip_suffix(";base64")?;
            return Some(Self::Inline {
                media_type: if media_type.is_empty() {
                    "application/octet-stream".to_string()
                } else {
                    media_type.to_string()
                },
                data: data.to_string(),
            });
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Some(Self::Remote {
                url: reference.to_string(),
            });
        }
        None
    }

    fn extension(&self, content_type: Option<&str>) -> String {
        let from_media = |mt: &str| {
            mt.split(';')
                .next()
                .and_then(|m| m.trim().strip_prefix("image/"))
                .map(|ext| if ext == "jpeg" { "jpg" } else { ext })
                .map(str::to_string)
        };
        match self {
            Self::Inline { media_type, .. } => from_media(media_type.as_str()),
            Self::Remote { url } => url
                .split(['?', '#'])
                .next()
                .and_then(|u| u.split_once("://"))
                .and_then(|(_, rest)| rest.split_once('/'))
                .and_then(|(_, path)| path.rsplit('/').next())
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty() && ext.len() <= 5)
                .or_else(|| content_type.and_then(from_media)),
        }
        .unwrap_or_else(|| "bin".to_string())
    }
}

/// Attachment files written into a private temporary directory.
///
/// The directory and everything in it is removed when this value drops.
#[derive(Debug)]
pub struct MaterializedAttachments {
    dir: TempDir,
    paths: Vec<PathBuf>,
}

impl MaterializedAttachments {
    /// Download or decode every attachment, in order.
    pub async fn materialize(
        client: &reqwest::Client,
        attachments: &[Attachment],
    ) -> Result<Self, CoreError> {
        let dir = tempfile::Builder::new()
            .prefix("chatrelay-")
            .tempdir()
            .map_err(|e| CoreError::UploadFailure(format!("temp dir: {}", e)))?;

        let mut paths = Vec::with_capacity(attachments.len());
        for (index, attachment) in attachments.iter().enumerate() {
            let (bytes, content_type) = match attachment {
                Attachment::Inline { data, .. } => {
                    let bytes = STANDARD.decode(data.trim()).map_err(|e| {
                        CoreError::UploadFailure(format!("attachment {}: invalid base64: {}", index, e))
                    })?;
                    (bytes, None)
                }
                Attachment::Remote { url } => download(client, url).await?,
            };

            let name = format!(
                "attachment-{}.{}",
                index,
                attachment.extension(content_type.as_deref())
            );
            let path = dir.path().join(name);
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| CoreError::UploadFailure(format!("write {}: {}", path.display(), e)))?;
            debug!(path = %path.display(), size = bytes.len(), "Attachment materialized");
            paths.push(path);
        }

        Ok(Self { dir, paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

async fn download(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, Option<String>), CoreError> {
    let failure = |e: reqwest::Error| CoreError::UploadFailure(format!("download {}: {}", url, e));

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(failure)?;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await.map_err(failure)?;

    Ok((bytes.to_vec(), content_type))
}

#[cfg(test)]
#[path = "attachments_tests.rs"]
mod tests;
