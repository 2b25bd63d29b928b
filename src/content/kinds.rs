//! The five content kinds: records, editable field sets and their descriptors.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::validate::check_range;
use super::{CheckMode, ContentKind, EntityKind, FieldCheck, ValidationError, nullable};

pub const DEFAULT_SERVICE_ICON: &str = "🧘";
pub const DEFAULT_SERVICE_BUTTON: &str = "Learn More";
pub const DEFAULT_SERVICE_COLOR: &str = "primary";
pub const DEFAULT_REVIEW_RATING: i32 = 5;
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

fn text_or_empty(value: &mut Option<String>) {
    value.get_or_insert_with(String::new);
}

// =============================================================================
// HERO SECTION
// =============================================================================

/// Landing banner. There is at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSection {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cta_primary_text: String,
    pub cta_secondary_text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_primary_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_secondary_text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeroKind;

impl ContentKind for HeroKind {
    const KIND: EntityKind = EntityKind::HeroSection;
    type Record = HeroSection;
    type Fields = HeroFields;

    fn draft_defaults() -> HeroFields {
        Self::creation_defaults(HeroFields::default())
    }

    fn creation_defaults(mut fields: HeroFields) -> HeroFields {
        text_or_empty(&mut fields.title);
        text_or_empty(&mut fields.description);
        text_or_empty(&mut fields.cta_primary_text);
        text_or_empty(&mut fields.cta_secondary_text);
        fields
    }

    fn fields_of(record: &HeroSection) -> HeroFields {
        HeroFields {
            title: Some(record.title.clone()),
            description: Some(record.description.clone()),
            cta_primary_text: Some(record.cta_primary_text.clone()),
            cta_secondary_text: Some(record.cta_secondary_text.clone()),
        }
    }

    fn record_id(record: &HeroSection) -> Uuid {
        record.id
    }

    fn check(fields: &HeroFields, mode: CheckMode) -> Result<(), ValidationError> {
        FieldCheck::new(Self::KIND, mode).text("title", fields.title.as_deref()).finish()
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Offered therapy, shown as a card with bullet points and a detail modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub points: Vec<String>,
    pub button_title: String,
    pub modal_content: String,
    pub icon_emoji: String,
    pub color_scheme: String,
    pub display_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceKind;

impl ContentKind for ServiceKind {
    const KIND: EntityKind = EntityKind::Service;
    type Record = Service;
    type Fields = ServiceFields;

    /// One empty point so the editor shows an input row straight away.
    fn draft_defaults() -> ServiceFields {
        Self::creation_defaults(ServiceFields { points: Some(vec![String::new()]), ..ServiceFields::default() })
    }

    fn creation_defaults(mut fields: ServiceFields) -> ServiceFields {
        text_or_empty(&mut fields.title);
        text_or_empty(&mut fields.description);
        fields.points.get_or_insert_with(Vec::new);
        fields.button_title.get_or_insert_with(|| DEFAULT_SERVICE_BUTTON.to_owned());
        text_or_empty(&mut fields.modal_content);
        fields.icon_emoji.get_or_insert_with(|| DEFAULT_SERVICE_ICON.to_owned());
        fields.color_scheme.get_or_insert_with(|| DEFAULT_SERVICE_COLOR.to_owned());
        fields
    }

    fn fields_of(record: &Service) -> ServiceFields {
        ServiceFields {
            title: Some(record.title.clone()),
            description: Some(record.description.clone()),
            points: Some(record.points.clone()),
            button_title: Some(record.button_title.clone()),
            modal_content: Some(record.modal_content.clone()),
            icon_emoji: Some(record.icon_emoji.clone()),
            color_scheme: Some(record.color_scheme.clone()),
            display_order: Some(record.display_order),
        }
    }

    fn record_id(record: &Service) -> Uuid {
        record.id
    }

    fn check(fields: &ServiceFields, mode: CheckMode) -> Result<(), ValidationError> {
        FieldCheck::new(Self::KIND, mode).text("title", fields.title.as_deref()).finish()
    }
}

// =============================================================================
// WORKSHOP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub display_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkshopKind;

impl ContentKind for WorkshopKind {
    const KIND: EntityKind = EntityKind::Workshop;
    type Record = Workshop;
    type Fields = WorkshopFields;

    fn draft_defaults() -> WorkshopFields {
        Self::creation_defaults(WorkshopFields::default())
    }

    fn creation_defaults(mut fields: WorkshopFields) -> WorkshopFields {
        text_or_empty(&mut fields.title);
        text_or_empty(&mut fields.description);
        text_or_empty(&mut fields.image_url);
        fields
    }

    fn fields_of(record: &Workshop) -> WorkshopFields {
        WorkshopFields {
            title: Some(record.title.clone()),
            description: Some(record.description.clone()),
            image_url: Some(record.image_url.clone()),
            display_order: Some(record.display_order),
        }
    }

    fn record_id(record: &Workshop) -> Uuid {
        record.id
    }

    fn check(fields: &WorkshopFields, mode: CheckMode) -> Result<(), ValidationError> {
        FieldCheck::new(Self::KIND, mode)
            .text("title", fields.title.as_deref())
            .text("image_url", fields.image_url.as_deref())
            .finish()
    }

    fn image_slot(fields: &mut WorkshopFields) -> Option<&mut Option<String>> {
        Some(&mut fields.image_url)
    }
}

// =============================================================================
// GALLERY IMAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: String,
    /// Caption, optional.
    pub description: Option<String>,
    pub display_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// `Some(None)` clears the caption back to NULL.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GalleryKind;

impl ContentKind for GalleryKind {
    const KIND: EntityKind = EntityKind::GalleryImage;
    type Record = GalleryImage;
    type Fields = GalleryFields;

    fn draft_defaults() -> GalleryFields {
        GalleryFields {
            image_url: Some(String::new()),
            alt_text: Some(String::new()),
            description: Some(Some(String::new())),
            display_order: None,
        }
    }

    // The caption stays NULL unless supplied.
    fn creation_defaults(fields: GalleryFields) -> GalleryFields {
        fields
    }

    fn fields_of(record: &GalleryImage) -> GalleryFields {
        GalleryFields {
            image_url: Some(record.image_url.clone()),
            alt_text: Some(record.alt_text.clone()),
            description: Some(record.description.clone()),
            display_order: Some(record.display_order),
        }
    }

    fn record_id(record: &GalleryImage) -> Uuid {
        record.id
    }

    fn check(fields: &GalleryFields, mode: CheckMode) -> Result<(), ValidationError> {
        FieldCheck::new(Self::KIND, mode)
            .text("image_url", fields.image_url.as_deref())
            .text("alt_text", fields.alt_text.as_deref())
            .finish()
    }

    fn image_slot(fields: &mut GalleryFields) -> Option<&mut Option<String>> {
        Some(&mut fields.image_url)
    }
}

// =============================================================================
// REVIEW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub name: String,
    pub rating: i32,
    pub text: String,
    pub therapy: String,
    pub display_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewKind;

impl ContentKind for ReviewKind {
    const KIND: EntityKind = EntityKind::Review;
    type Record = Review;
    type Fields = ReviewFields;

    fn draft_defaults() -> ReviewFields {
        Self::creation_defaults(ReviewFields {
            name: Some(String::new()),
            rating: Some(DEFAULT_REVIEW_RATING),
            text: Some(String::new()),
            ..ReviewFields::default()
        })
    }

    fn creation_defaults(mut fields: ReviewFields) -> ReviewFields {
        text_or_empty(&mut fields.therapy);
        fields
    }

    fn fields_of(record: &Review) -> ReviewFields {
        ReviewFields {
            name: Some(record.name.clone()),
            rating: Some(record.rating),
            text: Some(record.text.clone()),
            therapy: Some(record.therapy.clone()),
            display_order: Some(record.display_order),
        }
    }

    fn record_id(record: &Review) -> Uuid {
        record.id
    }

    fn check(fields: &ReviewFields, mode: CheckMode) -> Result<(), ValidationError> {
        FieldCheck::new(Self::KIND, mode)
            .text("name", fields.name.as_deref())
            .text("text", fields.text.as_deref())
            .present("rating", fields.rating.as_ref())
            .finish()?;
        check_range(Self::KIND, "rating", fields.rating, RATING_RANGE)
    }
}

#[cfg(test)]
#[path = "kinds_test.rs"]
mod tests;
