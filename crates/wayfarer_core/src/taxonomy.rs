//! URL taxonomy: deciding what an image value is and whether it needs migrating.
//!
//! An image value is migrated if and only if its URL is hosted on the blob
//! store. That predicate is the only record of migration state, which is
//! what makes repeated runs safe.

use base64::{engine::general_purpose::STANDARD, Engine};
use wayfarer_error::{ClassificationError, ClassificationErrorKind};

/// Shortest decoded payload accepted as a bare base64 image.
const MIN_INLINE_BYTES: usize = 8;

/// One host pattern: an exact host, or a `*.suffix` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HostPattern {
    Exact(String),
    Suffix(String),
}

impl HostPattern {
    fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern.is_empty() {
            return None;
        }
        match pattern.strip_prefix("*.") {
            Some(suffix) if !suffix.is_empty() => Some(HostPattern::Suffix(format!(".{}", suffix))),
            Some(_) => None,
            None => Some(HostPattern::Exact(pattern)),
        }
    }

    fn matches(&self, host: &str) -> bool {
        match self {
            HostPattern::Exact(exact) => host == exact,
            HostPattern::Suffix(suffix) => host.ends_with(suffix.as_str()),
        }
    }
}

/// The set of hosts that count as durable blob storage.
///
/// # Examples
///
/// ```
/// use wayfarer_core::BlobHostPattern;
///
/// let pattern = BlobHostPattern::new(["blob.store", "*.blob.core.windows.net"]);
/// assert!(pattern.matches("https://blob.store/cities/a.webp"));
/// assert!(pattern.matches("https://acct.blob.core.windows.net/media/x.png"));
/// assert!(!pattern.matches("https://img.example/a.jpg"));
/// assert!(!pattern.matches("not a url"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobHostPattern {
    patterns: Vec<HostPattern>,
}

impl BlobHostPattern {
    /// Build from host patterns; blank or malformed patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter_map(|p| HostPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    /// Add one more host pattern.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        if let Some(parsed) = HostPattern::parse(pattern) {
            if !self.patterns.contains(&parsed) {
                self.patterns.push(parsed);
            }
        }
        self
    }

    /// True when no pattern is configured (nothing counts as migrated).
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `value` is an http(s) URL hosted on blob storage.
    pub fn matches(&self, value: &str) -> bool {
        let Ok(parsed) = url::Url::parse(value.trim()) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.patterns.iter().any(|p| p.matches(&host))
    }
}

/// What an image value currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Missing or blank; nothing to do
    Empty,
    /// Already hosted on blob storage (terminal state)
    Blob(String),
    /// External http(s) URL awaiting migration
    Remote(String),
    /// Inline base64 payload awaiting migration
    Inline {
        /// Declared or sniffed MIME type
        mime: String,
        /// Decoded bytes
        data: Vec<u8>,
    },
}

impl ImageSource {
    /// Whether this value still needs to be moved into blob storage.
    pub fn needs_migration(&self) -> bool {
        matches!(self, ImageSource::Remote(_) | ImageSource::Inline { .. })
    }
}

/// Classify a stored image value.
///
/// # Errors
///
/// Returns a [`ClassificationError`] when the value is neither an http(s)
/// URL, a `data:` URI, nor a bare base64 image payload.
///
/// # Examples
///
/// ```
/// use wayfarer_core::{classify, BlobHostPattern, ImageSource};
///
/// let pattern = BlobHostPattern::new(["blob.store"]);
/// assert_eq!(classify("", &pattern).unwrap(), ImageSource::Empty);
/// assert!(matches!(classify("https://img.example/a.jpg", &pattern).unwrap(), ImageSource::Remote(_)));
/// assert!(matches!(classify("https://blob.store/a.jpg", &pattern).unwrap(), ImageSource::Blob(_)));
/// assert!(classify("ftp://img.example/a.jpg", &pattern).is_err());
/// ```
pub fn classify(value: &str, pattern: &BlobHostPattern) -> Result<ImageSource, ClassificationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(ImageSource::Empty);
    }

    if let Some(rest) = value.strip_prefix("data:") {
        return classify_data_uri(rest);
    }

    match url::Url::parse(value) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => {
                if pattern.matches(value) {
                    Ok(ImageSource::Blob(value.to_string()))
                } else {
                    Ok(ImageSource::Remote(value.to_string()))
                }
            }
            "http" | "https" => Err(ClassificationError::new(
                ClassificationErrorKind::Unrecognized(truncate(value)),
            )),
            scheme => Err(ClassificationError::new(
                ClassificationErrorKind::UnsupportedScheme(scheme.to_string()),
            )),
        },
        Err(_) => classify_bare_base64(value),
    }
}

/// The idempotency predicate: non-empty and not already on blob storage.
///
/// Values that fail classification also report `false`; they are recorded
/// as issues rather than migrated.
pub fn needs_migration(value: &str, pattern: &BlobHostPattern) -> bool {
    classify(value, pattern).is_ok_and(|source| source.needs_migration())
}

/// Sniff an image MIME type from magic bytes.
///
/// # Examples
///
/// ```
/// use wayfarer_core::sniff_image_mime;
///
/// assert_eq!(sniff_image_mime(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]), Some("image/png"));
/// assert_eq!(sniff_image_mime(b"hello"), None);
/// ```
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

fn classify_data_uri(rest: &str) -> Result<ImageSource, ClassificationError> {
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(ClassificationError::new(
            ClassificationErrorKind::Unrecognized(truncate(rest)),
        ));
    };
    let Some(mime) = header.strip_suffix(";base64") else {
        return Err(ClassificationError::new(
            ClassificationErrorKind::Unrecognized(format!("data:{}", truncate(header))),
        ));
    };
    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| ClassificationError::new(ClassificationErrorKind::InvalidBase64(e.to_string())))?;
    let mime = if mime.is_empty() {
        sniff_image_mime(&data).unwrap_or("application/octet-stream").to_string()
    } else {
        mime.to_string()
    };
    Ok(ImageSource::Inline { mime, data })
}

fn classify_bare_base64(value: &str) -> Result<ImageSource, ClassificationError> {
    let unrecognized =
        || ClassificationError::new(ClassificationErrorKind::Unrecognized(truncate(value)));

    let data = STANDARD.decode(value).map_err(|_| unrecognized())?;
    if data.len() < MIN_INLINE_BYTES {
        return Err(unrecognized());
    }
    let mime = sniff_image_mime(&data).ok_or_else(unrecognized)?;
    Ok(ImageSource::Inline {
        mime: mime.to_string(),
        data,
    })
}

fn truncate(value: &str) -> String {
    const MAX: usize = 80;
    if value.chars().count() <= MAX {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX).collect();
        format!("{}…", head)
    }
}
