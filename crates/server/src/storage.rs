// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Receipt file storage.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

/// Largest decoded receipt accepted, in bytes.
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while storing an uploaded file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file content is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("file is empty")]
    EmptyFile,
    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A backend that stores a file and returns its public URL.
pub trait FileStorage: Send + Sync {
    /// Stores `content` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unusable or the write fails.
    fn upload<'a>(
        &'a self,
        key: &'a str,
        content_type: &'a str,
        content: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<String, StorageError>> + Send + 'a>>;
}

/// Decodes a base64 upload body and enforces the size limit.
///
/// # Errors
///
/// Returns an error if the body is not base64, is empty, or is too large.
pub fn decode_upload(content_base64: &str) -> Result<Vec<u8>, StorageError> {
    // Base64 expands 3 bytes into 4 characters.
    if content_base64.len() / 4 * 3 > MAX_RECEIPT_BYTES + 3 {
        return Err(StorageError::TooLarge {
            limit: MAX_RECEIPT_BYTES,
        });
    }
    let content: Vec<u8> = STANDARD.decode(content_base64.trim())?;
    if content.is_empty() {
        return Err(StorageError::EmptyFile);
    }
    if content.len() > MAX_RECEIPT_BYTES {
        return Err(StorageError::TooLarge {
            limit: MAX_RECEIPT_BYTES,
        });
    }
    Ok(content)
}

/// Stores files below a local directory and serves them from a base URL.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn shared(self) -> Arc<dyn FileStorage> {
        Arc::new(self)
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative: &Path = Path::new(key);
        let only_normal: bool = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !only_normal {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalFileStorage {
    fn upload<'a>(
        &'a self,
        key: &'a str,
        content_type: &'a str,
        content: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<String, StorageError>> + Send + 'a>> {
        Box::pin(async move {
            let path: PathBuf = self.resolve(key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            debug!(path = %path.display(), content_type, "Writing uploaded file");
            tokio::fs::write(&path, &content).await?;

            let url: String = format!("{}/{key}", self.public_base_url);
            info!(key, size = content.len(), "Stored uploaded file");
            Ok(url)
        })
    }
}
