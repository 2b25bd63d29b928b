//! Required-field checks for content drafts.

use std::ops::RangeInclusive;

use super::EntityKind;

/// Whether a field set is a full insert or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Every required field must be present and non-blank.
    Create,
    /// Omitted fields keep their stored values; supplied ones must be non-blank.
    Patch,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} is missing required field(s): {}", .fields.join(", "))]
    MissingFields { kind: EntityKind, fields: Vec<&'static str> },
    #[error("{kind}.{field} must be within {min}..={max}, got {value}")]
    OutOfRange { kind: EntityKind, field: &'static str, min: i32, max: i32, value: i32 },
}

impl crate::error::ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        "E_VALIDATION"
    }

    fn status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// Collects missing required fields for one kind.
#[derive(Debug)]
pub struct FieldCheck {
    kind: EntityKind,
    mode: CheckMode,
    missing: Vec<&'static str>,
}

impl FieldCheck {
    #[must_use]
    pub fn new(kind: EntityKind, mode: CheckMode) -> Self {
        Self { kind, mode, missing: Vec::new() }
    }

    /// Required text column. Whitespace-only counts as absent.
    #[must_use]
    pub fn text(mut self, name: &'static str, value: Option<&str>) -> Self {
        let missing = match value {
            Some(text) => text.trim().is_empty(),
            None => self.mode == CheckMode::Create,
        };
        if missing {
            self.missing.push(name);
        }
        self
    }

    /// Required non-text column.
    #[must_use]
    pub fn present<T>(mut self, name: &'static str, value: Option<&T>) -> Self {
        if value.is_none() && self.mode == CheckMode::Create {
            self.missing.push(name);
        }
        self
    }

    /// # Errors
    ///
    /// Returns `MissingFields` when any required field was missing.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields { kind: self.kind, fields: self.missing })
        }
    }
}

/// Checks an optional integer column against an inclusive range.
///
/// # Errors
///
/// Returns `OutOfRange` when the value is set and outside `range`.
pub fn check_range(
    kind: EntityKind,
    field: &'static str,
    value: Option<i32>,
    range: RangeInclusive<i32>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !range.contains(&v) => {
            Err(ValidationError::OutOfRange { kind, field, min: *range.start(), max: *range.end(), value: v })
        }
        _ => Ok(()),
    }
}
