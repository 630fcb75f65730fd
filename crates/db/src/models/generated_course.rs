//! Saved course history.

use coursecraft_core::course::FormData;
use coursecraft_core::materials::{Materials, Section};
use coursecraft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from `generated_courses`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourse {
    pub id: DbId,
    #[serde(skip)]
    pub user_id: DbId,
    pub job_id: Option<String>,
    pub title: String,
    pub form_data: Json<FormData>,
    pub sections: Json<Vec<Section>>,
    pub created_at: Timestamp,
}

impl GeneratedCourse {
    pub fn materials(&self) -> Materials {
        Materials::new(self.sections.0.clone())
    }

    /// The course as one Markdown document.
    pub fn to_markdown(&self) -> String {
        self.materials().to_markdown(&self.title)
    }
}

/// History list entry, without the section bodies.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourseSummary {
    pub id: DbId,
    pub job_id: Option<String>,
    pub title: String,
    pub section_count: i32,
    pub created_at: Timestamp,
}

/// DTO for saving a course.
#[derive(Debug)]
pub struct CreateGeneratedCourse {
    pub user_id: DbId,
    pub job_id: Option<String>,
    pub title: String,
    pub form_data: FormData,
    pub sections: Vec<Section>,
}
