//! Uploaded file storage.

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use futures_util::future::BoxFuture;
use tokio::io::AsyncWriteExt;

use crate::config::UploadConfig;

const SUFFIX_LEN: usize = 12;
const MAX_STEM_LEN: usize = 64;

/// Object storage collaborator for uploaded images.
pub trait BlobStore: Send + Sync {
    /// Store `data` under a name derived from `file_name`; returns its public URL.
    fn put<'a>(&'a self, file_name: &'a str, data: Bytes) -> BoxFuture<'a, io::Result<String>>;
}

/// Writes blobs into a directory served under a public URL prefix.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    directory: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(directory: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.directory, &config.public_prefix)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn write(&self, file_name: &str, data: Bytes) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let name = blob_name(file_name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.directory.join(&name))
            .await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::info!(name = %name, bytes = data.len(), "Stored upload");
        Ok(format!("{}/{}", self.public_prefix.trim_end_matches('/'), name))
    }
}

impl BlobStore for LocalBlobStore {
    fn put<'a>(&'a self, file_name: &'a str, data: Bytes) -> BoxFuture<'a, io::Result<String>> {
        Box::pin(self.write(file_name, data))
    }
}

/// `<sanitized stem>-<random suffix>[.<ext>]`
pub fn blob_name(file_name: &str) -> String {
    // Browsers may send a full client path.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut clean: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .take(MAX_STEM_LEN)
        .collect();
    clean = clean.trim_matches('-').to_string();
    if clean.is_empty() {
        clean.push_str("upload");
    }

    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(SUFFIX_LEN)
        .collect();

    let ext: Option<String> = ext
        .map(|e| e.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect::<String>())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => format!("{}-{}.{}", clean, suffix, ext),
        None => format!("{}-{}", clean, suffix),
    }
}
