//! Saved course history of the signed-in trainer.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use coursecraft_core::course::{validate_form_data, FormData};
use coursecraft_core::error::CoreError;
use coursecraft_core::job::JobStatus;
use coursecraft_core::materials::Section;
use coursecraft_core::types::DbId;
use coursecraft_db::models::generated_course::{
    CreateGeneratedCourse, GeneratedCourse, GeneratedCourseSummary,
};
use coursecraft_db::repositories::GeneratedCourseRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /me/courses`.
///
/// Either `jobId` (copy a completed job from the job store) or an explicit
/// `formData` plus `sections`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCourseRequest {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub form_data: Option<FormData>,
    pub sections: Option<Vec<Section>>,
}

fn course_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Course",
        id: id.to_string(),
    })
}

/// GET /api/v1/me/courses
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<GeneratedCourseSummary>>>> {
    let courses = GeneratedCourseRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// POST /api/v1/me/courses
pub async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SaveCourseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GeneratedCourse>>)> {
    let create = match input.job_id {
        Some(job_id) => from_job(&state, auth.user_id, job_id, input.title).await?,
        None => from_explicit(auth.user_id, input.title, input.form_data, input.sections)?,
    };

    let course = GeneratedCourseRepo::create(&state.pool, &create).await?;
    tracing::info!(
        user_id = auth.user_id,
        course_id = course.id,
        job_id = ?course.job_id,
        "Course saved to history",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// Build the row from a completed job owned by the caller (or anonymous).
async fn from_job(
    state: &AppState,
    user_id: DbId,
    job_id: String,
    title: Option<String>,
) -> AppResult<CreateGeneratedCourse> {
    let job = state
        .pipeline
        .store()
        .get(&job_id)
        .await
        .filter(|job| job.owner_id.map_or(true, |owner| owner == user_id))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Job",
                id: job_id.clone(),
            })
        })?;

    let materials = match (job.status, job.data) {
        (JobStatus::Completed, Some(materials)) if !materials.is_empty() => materials,
        (status, _) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Job {job_id} is {} and has no materials to save",
                status.as_str()
            ))));
        }
    };

    Ok(CreateGeneratedCourse {
        user_id,
        title: title.unwrap_or_else(|| job.form_data.title()),
        job_id: Some(job_id),
        form_data: job.form_data,
        sections: materials.sections,
    })
}

fn from_explicit(
    user_id: DbId,
    title: Option<String>,
    form_data: Option<FormData>,
    sections: Option<Vec<Section>>,
) -> AppResult<CreateGeneratedCourse> {
    let form_data = form_data.ok_or_else(|| {
        AppError::BadRequest("Either jobId or formData and sections is required".into())
    })?;
    validate_form_data(&form_data)?;

    let sections = sections.unwrap_or_default();
    if sections.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "sections must not be empty".into(),
        )));
    }

    Ok(CreateGeneratedCourse {
        user_id,
        title: title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| form_data.title()),
        job_id: None,
        form_data,
        sections,
    })
}

/// GET /api/v1/me/courses/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GeneratedCourse>>> {
    let course = GeneratedCourseRepo::find_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/me/courses/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GeneratedCourseRepo::delete_for_user(&state.pool, id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(course_not_found(id))
    }
}

/// GET /api/v1/me/courses/{id}/download
///
/// The whole course as a Markdown attachment.
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = GeneratedCourseRepo::find_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    let disposition = format!("attachment; filename=\"{}.md\"", slugify(&course.title));
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        course.to_markdown(),
    ))
}

/// ASCII file-name slug: lowercase alphanumerics joined by single dashes.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "course".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use coursecraft_core::materials::SectionType;

    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Leadership basics: Day 1!"), "leadership-basics-day-1");
        assert_eq!(slugify("  --  "), "course");
        assert_eq!(slugify("Économie"), "conomie");
    }

    #[test]
    fn explicit_save_requires_sections() {
        let form = FormData {
            subject: "Leadership basics".into(),
            ..Default::default()
        };
        let err = from_explicit(1, None, Some(form.clone()), Some(vec![])).unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Validation(_))));

        let sections = vec![Section::new(SectionType::Slides, "Slides", "Slide 1")];
        let create = from_explicit(1, Some("  ".into()), Some(form), Some(sections)).unwrap();
        assert_eq!(create.title, "Leadership basics");
        assert!(create.job_id.is_none());
    }

    #[test]
    fn explicit_save_without_form_is_bad_request() {
        let err = from_explicit(1, None, None, None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
