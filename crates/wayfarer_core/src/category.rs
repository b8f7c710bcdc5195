//! Image category enumeration.

use serde::{Deserialize, Serialize};
use wayfarer_error::ValidationError;

/// Purpose of an image, determining its blob path prefix and compression profile.
///
/// The set is fixed; parsing any other value is a caller error.
///
/// # Examples
///
/// ```
/// use wayfarer_core::MediaCategory;
///
/// let category: MediaCategory = "highlights".parse().unwrap();
/// assert_eq!(category.path_prefix(), "highlights");
/// assert!("stock".parse::<MediaCategory>().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// Destination hero and gallery images
    #[display("cities")]
    Cities,
    /// Curated highlight images
    #[display("highlights")]
    Highlights,
    /// Activity and attraction images
    #[display("activities")]
    Activities,
    /// Hotel and lodging images
    #[display("accommodations")]
    Accommodations,
}

impl MediaCategory {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Cities => "cities",
            MediaCategory::Highlights => "highlights",
            MediaCategory::Activities => "activities",
            MediaCategory::Accommodations => "accommodations",
        }
    }

    /// Blob path prefix uploads of this category are stored under.
    pub fn path_prefix(&self) -> &'static str {
        self.as_str()
    }
}

impl std::str::FromStr for MediaCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cities" => Ok(MediaCategory::Cities),
            "highlights" => Ok(MediaCategory::Highlights),
            "activities" => Ok(MediaCategory::Activities),
            "accommodations" => Ok(MediaCategory::Accommodations),
            _ => Err(ValidationError::new(format!(
                "Unknown media category '{}' (expected cities, highlights, activities or accommodations)",
                s
            ))),
        }
    }
}
