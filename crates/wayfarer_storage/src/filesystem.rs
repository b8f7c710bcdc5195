//! Filesystem-based blob storage implementation.
//!
//! This backend writes blobs into a local directory tree that a web server
//! (or CDN origin) exposes under a public base URL.

use crate::fetch::abbreviate;
use crate::naming::{blob_file_name, slugify, BlobNaming};
use crate::{BlobReference, BlobStorage, SourceFetcher};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;
use wayfarer_core::{sniff_image_mime, BlobHostPattern, MediaCategory};
use wayfarer_error::{StorageError, StorageErrorKind, WayfarerResult};

/// Filesystem blob backend.
///
/// Stores blobs as `{root}/{category}/{file}` and serves them as
/// `{public_base_url}/{category}/{file}`.
///
/// # Example Structure
///
/// ```text
/// /var/wayfarer/blob/
/// ├── cities/
/// │   ├── lisbon-hero-1700000000000-3f2a9c1e.webp
/// │   └── lisbon-gallery-0-1700000000123-b07d44a2.webp
/// ├── highlights/
/// │   └── lisbon-highlight-0-1700000000456-91ce0f3b.jpg
/// └── accommodations/
///     └── lisbon-accommodation-2-1700000000789-5ad8e612.png
/// ```
///
/// # Features
///
/// - **Atomic writes**: Uses a temp file, so readers never see partial blobs
/// - **No overwrites**: Timestamp-named keys carry a random token and an
///   existing file is never replaced
/// - **Host ownership**: The host of the public base URL always counts as a blob host
#[derive(Debug, Clone)]
pub struct FileSystemBlobStorage {
    root: PathBuf,
    public_base_url: Url,
    host_pattern: BlobHostPattern,
    naming: BlobNaming,
    fetcher: SourceFetcher,
}

impl FileSystemBlobStorage {
    /// Create a new filesystem blob backend.
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory blobs are written under
    /// * `public_base_url` - URL the root directory is served at
    /// * `naming` - Filename uniqueness strategy
    /// * `fetcher` - Used by `upload_from_url`
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the directory cannot be created.
    #[tracing::instrument(skip(root, fetcher))]
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: &str,
        naming: BlobNaming,
        fetcher: SourceFetcher,
    ) -> WayfarerResult<Self> {
        let root = root.into();
        let public_base_url = parse_base_url(public_base_url)?;

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        let host_pattern = public_base_url
            .host_str()
            .map(|host| BlobHostPattern::default().with_pattern(host))
            .unwrap_or_default();

        info!(path = %root.display(), base_url = %public_base_url, %naming, "Created filesystem blob storage");
        Ok(Self {
            root,
            public_base_url,
            host_pattern,
            naming,
            fetcher,
        })
    }

    /// Also treat these hosts (exact or `*.suffix`) as already migrated.
    pub fn with_host_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.host_pattern = self.host_pattern.with_pattern(pattern.as_ref());
        }
        self
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Write `data` to `path` via a temp file.
    ///
    /// Timestamp-named blobs never replace an existing file; content-hash
    /// blobs may, since equal keys mean equal bytes.
    async fn write_blob(&self, path: &Path, data: &[u8]) -> WayfarerResult<WriteOutcome> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension(format!("tmp.{}", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        let placed = match self.naming {
            BlobNaming::Timestamp => tokio::fs::hard_link(&temp_path, path).await,
            BlobNaming::ContentHash => tokio::fs::rename(&temp_path, path).await,
        };
        let outcome = match placed {
            Ok(()) => Ok(WriteOutcome::Written),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(WriteOutcome::Taken),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "place {} at {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into()),
        };
        if self.naming == BlobNaming::Timestamp || outcome.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        outcome
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.public_base_url, key)
    }

    /// Map a public URL back to its on-disk path, if it belongs to this backend.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let key = url.strip_prefix(self.public_base_url.as_str())?;
        if key.is_empty() || key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            return None;
        }
        Some(self.root.join(key))
    }
}

const MAX_NAME_ATTEMPTS: usize = 3;

enum WriteOutcome {
    Written,
    Taken,
}

/// Unique part of a timestamp-named blob: unix millis plus a short random token.
fn upload_stamp() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), &token[..8])
}

/// Parse and normalise the base URL so it always ends with `/`.
fn parse_base_url(raw: &str) -> WayfarerResult<Url> {
    let mut normalised = raw.trim().to_string();
    if !normalised.ends_with('/') {
        normalised.push('/');
    }
    let url = Url::parse(&normalised).map_err(|e| {
        StorageError::new(StorageErrorKind::InvalidConfig(format!(
            "public base URL '{}': {}",
            raw, e
        )))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(StorageError::new(StorageErrorKind::InvalidConfig(format!(
            "public base URL '{}' must be an http(s) URL with a host",
            raw
        )))
        .into());
    }
    Ok(url)
}

#[async_trait]
impl BlobStorage for FileSystemBlobStorage {
    #[instrument(skip(self, data), fields(size = data.len(), %category))]
    async fn upload_from_bytes(
        &self,
        data: &[u8],
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        let content_type = sniff_image_mime(data)
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut attempt = 0;
        let key = loop {
            attempt += 1;
            let file_name = blob_file_name(filename, data, self.naming, upload_stamp());
            let key = format!("{}/{}", category.path_prefix(), file_name);
            let path = self.root.join(category.path_prefix()).join(&file_name);

            // Content-hash keys are shared by identical bytes
            if self.naming == BlobNaming::ContentHash
                && tokio::fs::try_exists(&path).await.unwrap_or(false)
            {
                debug!(key = %key, "Blob already exists, returning existing reference");
                return Ok(BlobReference {
                    url: self.url_for(&key),
                    key,
                    category,
                    size_bytes: data.len() as u64,
                    content_type,
                });
            }

            match self.write_blob(&path, data).await? {
                WriteOutcome::Written => break key,
                WriteOutcome::Taken if attempt < MAX_NAME_ATTEMPTS => {
                    debug!(key = %key, attempt, "Blob key already taken, picking another");
                }
                WriteOutcome::Taken => {
                    return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                        "no free key for {} after {} attempts",
                        key, attempt
                    )))
                    .into());
                }
            }
        };

        info!(key = %key, size = data.len(), content_type = %content_type, "Stored blob");

        Ok(BlobReference {
            url: self.url_for(&key),
            key,
            category,
            size_bytes: data.len() as u64,
            content_type,
        })
    }

    #[instrument(skip(self, url), fields(url = %abbreviate(url), %category))]
    async fn upload_from_url(
        &self,
        url: &str,
        category: MediaCategory,
        filename: Option<&str>,
    ) -> WayfarerResult<BlobReference> {
        let data = self.fetcher.fetch(url).await?;
        self.upload_from_bytes(&data, category, filename).await
    }

    fn host_pattern(&self) -> &BlobHostPattern {
        &self.host_pattern
    }

    fn planned_url(&self, category: MediaCategory, filename: Option<&str>, extension: &str) -> String {
        let key = format!(
            "{}/{}-{}.{}",
            category.path_prefix(),
            slugify(filename.unwrap_or("image")),
            upload_stamp(),
            extension
        );
        self.url_for(&key)
    }

    async fn exists(&self, url: &str) -> WayfarerResult<bool> {
        match self.path_for_url(url) {
            Some(path) => Ok(tokio::fs::try_exists(&path).await.unwrap_or(false)),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://blob.store/media").unwrap();
        assert_eq!(url.as_str(), "https://blob.store/media/");
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("file:///tmp/blob").is_err());
        assert!(parse_base_url("not a url").is_err());
    }
}
