// Document relocation - moves an uploaded blob to long-term storage and
// returns a shareable reference

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected with status {status}: {body}")]
    Upload { status: u16, body: String },

    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}

/// Shareable reference to a relocated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicFile {
    pub url: String,
}

/// Moves uploaded file bytes to long-term storage.
///
/// Callers surface failures as a generic retry notice and keep the step
/// unresolved; the raw upload is never stored locally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRelocator: Send + Sync {
    async fn relocate(
        &self,
        bytes: Vec<u8>,
        original_name: &str,
    ) -> Result<PublicFile, RelocateError>;
}

/// Production relocator: multipart upload to the configured document-store
/// endpoint, which makes the blob world-readable and returns a view link.
#[derive(Debug, Clone)]
pub struct DriveRelocator {
    http: reqwest::Client,
    upload_url: String,
    token: Option<String>,
    folder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl DriveRelocator {
    pub fn new(upload_url: String, token: Option<String>, folder_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url,
            token,
            folder_id,
        }
    }

    /// Decorate the original name with a timestamp so repeated uploads of
    /// the same deck never collide in storage.
    fn storage_name(original_name: &str) -> String {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        match original_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}-{stamp}.{ext}"),
            None => format!("{original_name}-{stamp}"),
        }
    }
}

#[async_trait]
impl DocumentRelocator for DriveRelocator {
    async fn relocate(
        &self,
        bytes: Vec<u8>,
        original_name: &str,
    ) -> Result<PublicFile, RelocateError> {
        let name = Self::storage_name(original_name);
        let size = bytes.len();

        let metadata = serde_json::json!({
            "name": name,
            "folder": self.folder_id,
            "public": true,
        });
        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.clone())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new()
            .text("metadata", metadata.to_string())
            .part("file", file_part);

        debug!(name = %name, size, "uploading document");
        let mut request = self.http.post(&self.upload_url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelocateError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        let url = parsed
            .url
            .ok_or_else(|| RelocateError::MalformedResponse("missing url field".to_string()))?;
        info!(name = %name, url = %url, "document relocated");
        Ok(PublicFile { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_name_keeps_extension() {
        let name = DriveRelocator::storage_name("deck.pdf");
        assert!(name.starts_with("deck-"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn storage_name_without_extension() {
        let name = DriveRelocator::storage_name("deck");
        assert!(name.starts_with("deck-"));
        assert!(!name.contains('.'));
    }
}
