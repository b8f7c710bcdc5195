//! Image-bearing entity fields.

use crate::MediaCategory;
use serde::{Deserialize, Serialize};

/// One of the five image-bearing fields on an entity.
///
/// `Primary` holds a single value; the other four are ordered lists.
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
pub enum ImageField {
    /// Singular hero image
    #[serde(rename = "imageUrl")]
    #[display("imageUrl")]
    Primary,
    /// Destination gallery
    #[serde(rename = "imageUrls")]
    #[display("imageUrls")]
    Gallery,
    /// Highlight images
    #[serde(rename = "highlightImages")]
    #[display("highlightImages")]
    Highlights,
    /// Activity images
    #[serde(rename = "activityImages")]
    #[display("activityImages")]
    Activities,
    /// Accommodation images
    #[serde(rename = "accommodationImages")]
    #[display("accommodationImages")]
    Accommodations,
}

impl ImageField {
    /// Document key of this field.
    pub fn key(&self) -> &'static str {
        match self {
            ImageField::Primary => "imageUrl",
            ImageField::Gallery => "imageUrls",
            ImageField::Highlights => "highlightImages",
            ImageField::Activities => "activityImages",
            ImageField::Accommodations => "accommodationImages",
        }
    }

    /// Category uploads from this field are filed under.
    pub fn category(&self) -> MediaCategory {
        match self {
            ImageField::Primary | ImageField::Gallery => MediaCategory::Cities,
            ImageField::Highlights => MediaCategory::Highlights,
            ImageField::Activities => MediaCategory::Activities,
            ImageField::Accommodations => MediaCategory::Accommodations,
        }
    }

    /// Whether the field holds an ordered list rather than one value.
    pub fn is_list(&self) -> bool {
        !matches!(self, ImageField::Primary)
    }

    /// Short slug used when deriving blob filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            ImageField::Primary => "hero",
            ImageField::Gallery => "gallery",
            ImageField::Highlights => "highlight",
            ImageField::Activities => "activity",
            ImageField::Accommodations => "accommodation",
        }
    }
}
