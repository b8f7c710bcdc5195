//! Per-category compression profiles.

use crate::CompressionOptions;
use serde::{Deserialize, Serialize};
use wayfarer_core::MediaCategory;

/// Compression options for each image category.
///
/// # Examples
///
/// ```
/// use wayfarer_compression::CompressionProfiles;
/// use wayfarer_core::MediaCategory;
///
/// let profiles = CompressionProfiles::default();
/// let cities = profiles.get(MediaCategory::Cities);
/// assert_eq!(*cities.max_width(), Some(1920));
/// assert_eq!(cities.effective_quality(), 80);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionProfiles {
    /// Destination hero and gallery images
    #[serde(default = "cities_profile")]
    pub cities: CompressionOptions,
    /// Highlight images
    #[serde(default = "card_profile")]
    pub highlights: CompressionOptions,
    /// Activity images
    #[serde(default = "card_profile")]
    pub activities: CompressionOptions,
    /// Accommodation images
    #[serde(default = "accommodations_profile")]
    pub accommodations: CompressionOptions,
}

fn cities_profile() -> CompressionOptions {
    CompressionOptions::bounded(80, 1920, 1080)
}

fn card_profile() -> CompressionOptions {
    CompressionOptions::bounded(80, 1200, 800)
}

fn accommodations_profile() -> CompressionOptions {
    CompressionOptions::bounded(82, 1600, 1200)
}

impl Default for CompressionProfiles {
    fn default() -> Self {
        Self {
            cities: cities_profile(),
            highlights: card_profile(),
            activities: card_profile(),
            accommodations: accommodations_profile(),
        }
    }
}

impl CompressionProfiles {
    /// Options for a category.
    pub fn get(&self, category: MediaCategory) -> CompressionOptions {
        match category {
            MediaCategory::Cities => self.cities,
            MediaCategory::Highlights => self.highlights,
            MediaCategory::Activities => self.activities,
            MediaCategory::Accommodations => self.accommodations,
        }
    }
}
