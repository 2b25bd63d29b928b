//! Content kinds edited by the admin panel.
//!
//! DESIGN
//! ======
//! The five content kinds share one lifecycle. `ContentKind` describes what
//! differs between them (table, defaults, required fields, image slot) so the
//! repository and the edit session are written once and parameterised by kind.
//!
//! `Fields` types carry every editable column as `Option`. `None` means "not
//! specified": the column is left out of update patches, and it counts as
//! missing when a required column is absent on create.

pub mod kinds;
pub mod validate;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde::ser::Error as _;
use serde_json::{Map, Value};
use uuid::Uuid;

pub use kinds::{
    GalleryFields, GalleryImage, GalleryKind, HeroFields, HeroKind, HeroSection, Review, ReviewFields, ReviewKind,
    Service, ServiceFields, ServiceKind, Workshop, WorkshopFields, WorkshopKind,
};
pub use validate::{CheckMode, FieldCheck, ValidationError};

// =============================================================================
// ENTITY KIND
// =============================================================================

/// Runtime tag for the five content tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    HeroSection,
    Service,
    Workshop,
    GalleryImage,
    Review,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [Self::HeroSection, Self::Service, Self::Workshop, Self::GalleryImage, Self::Review];

    /// Backing table name.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::HeroSection => "hero_section",
            Self::Service => "services",
            Self::Workshop => "workshops",
            Self::GalleryImage => "gallery",
            Self::Review => "reviews",
        }
    }

    /// URL path segment used by the admin API.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::HeroSection => "hero",
            Self::Service => "services",
            Self::Workshop => "workshops",
            Self::GalleryImage => "gallery",
            Self::Review => "reviews",
        }
    }

    #[must_use]
    pub fn from_slug(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == raw)
    }

    /// Whether records of this kind carry `display_order`.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::HeroSection)
    }

    /// Columns an update may write. Identity and timestamps are excluded.
    #[must_use]
    pub fn mutable_columns(self) -> &'static [&'static str] {
        match self {
            Self::HeroSection => &["title", "description", "cta_primary_text", "cta_secondary_text"],
            Self::Service => &[
                "title",
                "description",
                "points",
                "button_title",
                "modal_content",
                "icon_emoji",
                "color_scheme",
                "display_order",
            ],
            Self::Workshop => &["title", "description", "image_url", "display_order"],
            Self::GalleryImage => &["image_url", "alt_text", "description", "display_order"],
            Self::Review => &["name", "rating", "text", "therapy", "display_order"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// =============================================================================
// KIND DESCRIPTOR
// =============================================================================

/// Static description of one content kind.
pub trait ContentKind: Send + Sync + 'static {
    const KIND: EntityKind;

    /// Persisted row, including identity, order and timestamps.
    type Record: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Editable columns, each optional.
    type Fields: Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Blank draft shown when the operator starts a new record.
    fn draft_defaults() -> Self::Fields;

    /// Fills optional columns left unspecified on create.
    fn creation_defaults(fields: Self::Fields) -> Self::Fields;

    /// Field-for-field copy of a persisted record.
    fn fields_of(record: &Self::Record) -> Self::Fields;

    fn record_id(record: &Self::Record) -> Uuid;

    /// Required-field and range checks.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    fn check(fields: &Self::Fields, mode: CheckMode) -> Result<(), ValidationError>;

    /// The image reference column, for kinds that have one.
    fn image_slot(_fields: &mut Self::Fields) -> Option<&mut Option<String>> {
        None
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Overlays every field set in `patch` onto `base`.
///
/// # Errors
///
/// Returns an error if either value does not serialize to a JSON object.
pub fn merge_fields<F: Serialize + DeserializeOwned>(base: &F, patch: &F) -> Result<F, serde_json::Error> {
    let mut merged = to_object(base)?;
    for (key, value) in to_object(patch)? {
        merged.insert(key, value);
    }
    serde_json::from_value(Value::Object(merged))
}

/// Field deserializer that keeps an explicit `null` apart from an absent key:
/// absent stays `None` (via `#[serde(default)]`), `null` becomes `Some(None)`.
///
/// # Errors
///
/// Returns the inner value's deserialization error.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Serializes a value that must be a JSON object (records, fields).
///
/// # Errors
///
/// Returns an error if serialization fails or yields a non-object.
pub fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!("expected a JSON object, got {other}"))),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
