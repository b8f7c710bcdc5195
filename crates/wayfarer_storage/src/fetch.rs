//! Fetching source image bytes.

use std::time::Duration;
use tracing::{debug, instrument};
use wayfarer_core::{classify, BlobHostPattern, ImageSource};
use wayfarer_error::{
    ConfigError, TransportError, TransportErrorKind, WayfarerError, WayfarerResult,
};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads source images over http(s) and decodes `data:` URIs in place.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    /// Create a fetcher with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> WayfarerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wayfarer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the bytes behind `url`.
    ///
    /// `data:` URIs and bare base64 payloads are decoded locally with no
    /// network call.
    ///
    /// # Errors
    ///
    /// Returns a transport error for request, status, body or timeout
    /// failures, and a classification error for values that are not
    /// fetchable at all.
    #[instrument(skip(self, url), fields(url = %abbreviate(url)))]
    pub async fn fetch(&self, url: &str) -> WayfarerResult<Vec<u8>> {
        let url = match classify(url, &BlobHostPattern::default())? {
            ImageSource::Inline { data, .. } => {
                debug!(size = data.len(), "Decoded inline payload");
                return Ok(data);
            }
            ImageSource::Remote(url) | ImageSource::Blob(url) => url,
            ImageSource::Empty => {
                return Err(TransportError::new(TransportErrorKind::Request(
                    "empty source URL".to_string(),
                ))
                .into());
            }
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(TransportErrorKind::Status {
                status_code: status.as_u16(),
                url,
            })
            .into());
        }

        let bytes = response.bytes().await.map_err(|e| {
            WayfarerError::from(TransportError::new(TransportErrorKind::Body(e.to_string())))
        })?;

        debug!(size = bytes.len(), "Fetched source image");
        Ok(bytes.to_vec())
    }
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> WayfarerError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout(url.to_string())
    } else {
        TransportErrorKind::Request(format!("{}: {}", url, err))
    };
    TransportError::new(kind).into()
}

/// Inline payloads can be megabytes; keep log fields short.
pub(crate) fn abbreviate(value: &str) -> String {
    const MAX: usize = 96;
    if value.len() <= MAX {
        value.to_string()
    } else {
        let mut end = MAX;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &value[..end])
    }
}
