//! Migration of a single image value.

use wayfarer_core::{ElementIssue, ImageField, IssueKind};
use wayfarer_error::{WayfarerError, WayfarerErrorKind};

/// One image value of an entity, addressed by field and list position.
#[derive(Debug, Clone)]
pub(crate) struct ElementJob {
    pub field: ImageField,
    pub index: Option<usize>,
    pub value: String,
}

impl ElementJob {
    /// Filename stem for the upload, e.g. `lisbon-gallery-2`.
    pub fn file_stem(&self, naming_source: &str) -> String {
        match self.index {
            Some(index) => format!("{}-{}-{}", naming_source, self.field.slug(), index),
            None => format!("{}-{}", naming_source, self.field.slug()),
        }
    }

    pub fn issue(&self, kind: IssueKind, message: impl Into<String>) -> ElementIssue {
        ElementIssue {
            field: self.field,
            index: self.index,
            value: abbreviate(&self.value),
            kind,
            message: message.into(),
        }
    }
}

/// What happened to one element.
#[derive(Debug, Clone)]
pub(crate) enum ElementOutcome {
    /// Empty or already on blob storage
    Kept,
    /// Replaced (or would be, in a dry run) by a blob URL
    Replaced(String),
    /// Failed; the original value stays in place
    Failed(ElementIssue),
}

/// Issue class for an element-level error.
pub(crate) fn issue_kind(error: &WayfarerError) -> IssueKind {
    match error.kind() {
        WayfarerErrorKind::Classification(_) => IssueKind::Unclassifiable,
        WayfarerErrorKind::Transport(_) => IssueKind::Transport,
        WayfarerErrorKind::Storage(_) => IssueKind::Storage,
        _ => IssueKind::Other,
    }
}

/// Inline payloads can be megabytes; keep reported values short.
pub(crate) fn abbreviate(value: &str) -> String {
    const MAX: usize = 120;
    if value.chars().count() <= MAX {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX).collect();
        format!("{}…", head)
    }
}

/// File extension a remote URL's path suggests, if any.
pub(crate) fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "jpeg" | "jpg" => Some("jpg".to_string()),
        "png" | "webp" | "gif" => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        let job = ElementJob {
            field: ImageField::Gallery,
            index: Some(2),
            value: String::new(),
        };
        assert_eq!(job.file_stem("lisbon"), "lisbon-gallery-2");

        let hero = ElementJob {
            field: ImageField::Primary,
            index: None,
            value: String::new(),
        };
        assert_eq!(hero.file_stem("lisbon"), "lisbon-hero");
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://img.example/a.JPEG?w=10").as_deref(), Some("jpg"));
        assert_eq!(url_extension("https://img.example/a.png").as_deref(), Some("png"));
        assert_eq!(url_extension("https://img.example/photo"), None);
        assert_eq!(url_extension("https://img.example/a.tiff"), None);
    }
}
