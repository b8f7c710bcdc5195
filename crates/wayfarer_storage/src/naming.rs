//! Deterministic blob path derivation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use wayfarer_core::sniff_image_mime;

/// How the unique part of a blob filename is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum BlobNaming {
    /// Upload time in unix milliseconds plus a per-upload token; re-uploading identical bytes creates a new object
    #[default]
    #[display("timestamp")]
    Timestamp,
    /// First 16 hex chars of the SHA-256 of the stored bytes; identical bytes share a key
    #[display("content_hash")]
    ContentHash,
}

fn non_alphanumeric() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes.
///
/// # Examples
///
/// ```
/// use wayfarer_storage::slugify;
///
/// assert_eq!(slugify("São Paulo - Centro!"), "s-o-paulo-centro");
/// assert_eq!(slugify("  Lisbon  "), "lisbon");
/// assert_eq!(slugify("***"), "image");
/// ```
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = non_alphanumeric().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.chars().take(80).collect::<String>().trim_end_matches('-').to_string()
    }
}

/// File extension for the sniffed image type of `data`.
pub fn extension_for(data: &[u8]) -> &'static str {
    match sniff_image_mime(data) {
        Some("image/webp") => "webp",
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/gif") => "gif",
        _ => "bin",
    }
}

/// Build `{slug}-{unique}.{ext}` for an upload.
///
/// `stamp` is the unique part under [`BlobNaming::Timestamp`]; content-hash
/// naming ignores it.
///
/// # Examples
///
/// ```
/// use wayfarer_storage::{blob_file_name, BlobNaming};
///
/// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// assert_eq!(
///     blob_file_name(Some("Lisbon Hero"), &png, BlobNaming::Timestamp, 1_700_000_000_000_u64),
///     "lisbon-hero-1700000000000.png"
/// );
/// ```
pub fn blob_file_name(
    filename: Option<&str>,
    data: &[u8],
    naming: BlobNaming,
    stamp: impl std::fmt::Display,
) -> String {
    let slug = slugify(filename.unwrap_or("image"));
    let unique = match naming {
        BlobNaming::Timestamp => stamp.to_string(),
        BlobNaming::ContentHash => {
            let digest = Sha256::digest(data);
            format!("{:x}", digest).chars().take(16).collect()
        }
    };
    format!("{}-{}.{}", slug, unique, extension_for(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_naming_is_stable() {
        let a = blob_file_name(Some("x"), b"same bytes", BlobNaming::ContentHash, 1);
        let b = blob_file_name(Some("x"), b"same bytes", BlobNaming::ContentHash, 2);
        assert_eq!(a, b);
        assert!(a.ends_with(".bin"));
        assert_eq!(a.len(), "x-".len() + 16 + ".bin".len());
    }

    #[test]
    fn test_timestamp_naming_changes_with_time() {
        let a = blob_file_name(Some("x"), b"same bytes", BlobNaming::Timestamp, 1);
        let b = blob_file_name(Some("x"), b"same bytes", BlobNaming::Timestamp, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_filename_defaults() {
        assert_eq!(blob_file_name(None, b"", BlobNaming::Timestamp, 5), "image-5.bin");
    }
}
