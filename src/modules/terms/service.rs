use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::TermId;

use crate::modules::terms::model::{
    CreateTermDto, PaginatedTermsResponse, Term, TermFilterParams, UpdateTermDto,
};

const TERM_COLUMNS: &str =
    "id, name, academic_year, start_date, end_date, is_active, created_at, updated_at";

pub struct TermService;

impl TermService {
    fn dates_overlap(start1: NaiveDate, end1: NaiveDate, start2: NaiveDate, end2: NaiveDate) -> bool {
        start1 < end2 && start2 < end1
    }

    /// Dates must be ordered and must not overlap another term of the same
    /// academic year.
    async fn validate_term_dates(
        conn: &mut PgConnection,
        academic_year: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_term_id: Option<TermId>,
    ) -> Result<(), AppError> {
        if start_date >= end_date {
            return Err(AppError::bad_request(anyhow!(
                "Start date must be before end date"
            )));
        }

        let existing_terms = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE academic_year = $1 ORDER BY start_date"
        ))
        .bind(academic_year)
        .fetch_all(conn)
        .await?;

        let clash = existing_terms
            .iter()
            .filter(|term| Some(term.id) != exclude_term_id)
            .find(|term| Self::dates_overlap(start_date, end_date, term.start_date, term.end_date));

        if let Some(term) = clash {
            return Err(AppError::bad_request(anyhow!(
                "Term dates overlap with existing term: {} ({} to {})",
                term.name,
                term.start_date,
                term.end_date
            )));
        }

        Ok(())
    }

    /// Serializes writers of one academic year so the overlap check holds.
    async fn lock_academic_year(conn: &mut PgConnection, academic_year: &str) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(format!("terms:{academic_year}"))
            .execute(conn)
            .await?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn create_term(db: &PgPool, dto: CreateTermDto) -> Result<Term, AppError> {
        let mut tx = db.begin().await?;
        Self::lock_academic_year(&mut tx, &dto.academic_year).await?;
        Self::validate_term_dates(&mut tx, &dto.academic_year, dto.start_date, dto.end_date, None)
            .await?;

        let term = sqlx::query_as::<_, Term>(&format!(
            r#"INSERT INTO terms (name, academic_year, start_date, end_date)
               VALUES ($1, $2, $3, $4)
               RETURNING {TERM_COLUMNS}"#
        ))
        .bind(&dto.name)
        .bind(&dto.academic_year)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(term)
    }

    #[instrument(skip(db))]
    pub async fn get_terms(
        db: &PgPool,
        filters: TermFilterParams,
    ) -> Result<PaginatedTermsResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::text IS NULL OR academic_year = $1)
              AND ($2::boolean IS NULL OR is_active = $2)"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM terms {FILTER}"))
            .bind(&filters.academic_year)
            .bind(filters.is_active)
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms {FILTER} ORDER BY start_date DESC LIMIT $3 OFFSET $4"
        ))
        .bind(&filters.academic_year)
        .bind(filters.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedTermsResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_term(db: &PgPool, id: TermId) -> Result<Term, AppError> {
        sqlx::query_as::<_, Term>(&format!("SELECT {TERM_COLUMNS} FROM terms WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Term not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_active_term(db: &PgPool) -> Result<Term, AppError> {
        sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE is_active"
        ))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("No active term")))
    }

    #[instrument(skip(db))]
    pub async fn update_term(
        db: &PgPool,
        id: TermId,
        dto: UpdateTermDto,
    ) -> Result<Term, AppError> {
        let existing = Self::get_term(db, id).await?;
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);

        let mut tx = db.begin().await?;
        Self::lock_academic_year(&mut tx, &existing.academic_year).await?;
        Self::validate_term_dates(&mut tx, &existing.academic_year, start_date, end_date, Some(id))
            .await?;

        let term = sqlx::query_as::<_, Term>(&format!(
            r#"UPDATE terms
               SET name = COALESCE($1, name), start_date = $2, end_date = $3, updated_at = NOW()
               WHERE id = $4
               RETURNING {TERM_COLUMNS}"#
        ))
        .bind(&dto.name)
        .bind(start_date)
        .bind(end_date)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Term not found")))?;

        tx.commit().await?;
        Ok(term)
    }

    #[instrument(skip(db))]
    pub async fn delete_term(db: &PgPool, id: TermId) -> Result<(), AppError> {
        let schedule_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedules WHERE term_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        if schedule_count > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete term with {} schedule slot(s)",
                schedule_count
            )));
        }

        let result = sqlx::query("DELETE FROM terms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "Term has schedule slots"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Term not found")));
        }
        Ok(())
    }

    /// Makes `id` the only active term.
    #[instrument(skip(db))]
    pub async fn activate_term(db: &PgPool, id: TermId) -> Result<Term, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE terms SET is_active = FALSE, updated_at = NOW() WHERE is_active AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let term = sqlx::query_as::<_, Term>(&format!(
            r#"UPDATE terms SET is_active = TRUE, updated_at = NOW()
               WHERE id = $1
               RETURNING {TERM_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Term not found")))?;

        tx.commit().await?;
        info!(term_id = %id, "term activated");
        Ok(term)
    }
}
