use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use classbook_core::{AppError, PaginationMeta};
use classbook_models::SubjectId;

use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};

const SUBJECT_COLUMNS: &str = "id, code, name, description, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        sqlx::query_as::<_, Subject>(&format!(
            r#"INSERT INTO subjects (code, name, description)
               VALUES (UPPER($1), $2, $3)
               RETURNING {SUBJECT_COLUMNS}"#
        ))
        .bind(&dto.code)
        .bind(&dto.name)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Subject code already exists"))
    }

    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        filters: SubjectFilterParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::text IS NULL OR code ILIKE '%' || $1 || '%' OR name ILIKE '%' || $1 || '%')"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM subjects {FILTER}"))
                .bind(&filters.search)
                .fetch_one(db)
                .await?;

        let data = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects {FILTER} ORDER BY name LIMIT $2 OFFSET $3"
        ))
        .bind(&filters.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedSubjectsResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: SubjectId) -> Result<Subject, AppError> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_subject(
        db: &PgPool,
        id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        sqlx::query_as::<_, Subject>(&format!(
            r#"UPDATE subjects
               SET code = COALESCE(UPPER($1), code),
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   updated_at = NOW()
               WHERE id = $4
               RETURNING {SUBJECT_COLUMNS}"#
        ))
        .bind(&dto.code)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Subject code already exists"))?
        .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: SubjectId) -> Result<(), AppError> {
        let in_use =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedules WHERE subject_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        if in_use > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete subject used by {} schedule slot(s)",
                in_use
            )));
        }

        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "Subject is still referenced by schedules"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Subject not found")));
        }
        Ok(())
    }
}
