//! Generation form parameters and their validation.
//!
//! The form is deliberately permissive: only `subject` is required, every
//! other field may be left blank and the prompt builder substitutes a
//! neutral default.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Maximum length of the free-form context field. Must match the
/// `length` bound on [`FormData::context`].
pub const MAX_CONTEXT_LEN: usize = 4000;

/// How much material a generation request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationType {
    /// All four sections. Counts against the subscription quota.
    #[default]
    Complete,
    /// Lesson plan only. Free of charge.
    Preview,
}

impl GenerationType {
    /// Whether a request of this type consumes one generation from the
    /// user's remaining counter.
    pub fn consumes_quota(self) -> bool {
        matches!(self, GenerationType::Complete)
    }
}

/// The trainer's generation parameters, immutable once a job is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub level: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub audience: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub duration: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub tone: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub language: String,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_type: Option<GenerationType>,
}

impl FormData {
    /// The requested generation type, defaulting to [`GenerationType::Complete`].
    pub fn generation_type(&self) -> GenerationType {
        self.generation_type.unwrap_or_default()
    }

    /// A short human title for the course, used for saved history entries
    /// and download file names.
    pub fn title(&self) -> String {
        let subject = self.subject.trim();
        if subject.is_empty() {
            "Untitled course".to_string()
        } else {
            subject.to_string()
        }
    }
}

/// Validate a submitted form.
///
/// The subject must be non-empty after trimming; every field is bounded in
/// length.
pub fn validate_form_data(form: &FormData) -> Result<(), CoreError> {
    if form.subject.trim().is_empty() {
        return Err(CoreError::Validation("subject is required".to_string()));
    }
    form.validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}
