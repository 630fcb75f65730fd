//! Repository for the `generated_courses` table.
//!
//! Every read and delete is scoped to the owning user.

use coursecraft_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::generated_course::{
    CreateGeneratedCourse, GeneratedCourse, GeneratedCourseSummary,
};

const COLUMNS: &str = "id, user_id, job_id, title, form_data, sections, created_at";

pub struct GeneratedCourseRepo;

impl GeneratedCourseRepo {
    /// Save a course, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedCourse,
    ) -> Result<GeneratedCourse, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_courses (user_id, job_id, title, form_data, sections)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedCourse>(&query)
            .bind(input.user_id)
            .bind(&input.job_id)
            .bind(&input.title)
            .bind(Json(&input.form_data))
            .bind(Json(&input.sections))
            .fetch_one(pool)
            .await
    }

    /// A user's saved courses, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<GeneratedCourseSummary>, sqlx::Error> {
        sqlx::query_as::<_, GeneratedCourseSummary>(
            "SELECT id, job_id, title, jsonb_array_length(sections) AS section_count, created_at
             FROM generated_courses
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Find one course owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<GeneratedCourse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generated_courses WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, GeneratedCourse>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one course owned by `user_id`. Returns `true` if a row was removed.
    pub async fn delete_for_user(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM generated_courses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
