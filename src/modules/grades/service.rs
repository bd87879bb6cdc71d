use anyhow::anyhow;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{GradeId, StudentId, TermId, UserId};

use crate::metrics::track_grade_write;
use crate::modules::attendance::model::StudentRecapQuery;
use crate::modules::attendance::service::AttendanceService;
use crate::modules::grades::model::{
    CreateGradeDto, Grade, GradeFilterParams, GradeLetter, PaginatedGradesResponse, ReportCard,
    UpdateGradeDto, final_score, summarize,
};

const GRADE_SELECT: &str = r#"SELECT
        g.id, g.student_id, st.full_name AS student_name,
        g.subject_id, su.name AS subject_name, g.term_id,
        g.daily_score, g.midterm_score, g.final_exam_score,
        g.final_score, g.letter_grade, g.note, g.recorded_by,
        g.created_at, g.updated_at
    FROM grades g
    JOIN students st ON st.id = g.student_id
    JOIN subjects su ON su.id = g.subject_id"#;

#[derive(FromRow)]
struct ReportCardHeader {
    student_number: String,
    student_name: String,
    class_name: Option<String>,
}

pub struct GradeService;

impl GradeService {
    async fn fetch_grade(conn: &mut PgConnection, id: GradeId) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!("{GRADE_SELECT} WHERE g.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    #[instrument(skip(db, dto), fields(student_id = %dto.student_id, subject_id = %dto.subject_id))]
    pub async fn create_grade(
        db: &PgPool,
        dto: CreateGradeDto,
        recorded_by: UserId,
    ) -> Result<Grade, AppError> {
        let mut conn = db.acquire().await?;

        let (student, subject, term) = sqlx::query_as::<_, (bool, bool, bool)>(
            r#"SELECT
                EXISTS(SELECT 1 FROM students WHERE id = $1),
                EXISTS(SELECT 1 FROM subjects WHERE id = $2),
                EXISTS(SELECT 1 FROM terms WHERE id = $3)"#,
        )
        .bind(dto.student_id)
        .bind(dto.subject_id)
        .bind(dto.term_id)
        .fetch_one(&mut *conn)
        .await?;

        if !student {
            return Err(AppError::bad_request(anyhow!("Student not found")));
        }
        if !subject {
            return Err(AppError::bad_request(anyhow!("Subject not found")));
        }
        if !term {
            return Err(AppError::bad_request(anyhow!("Term not found")));
        }

        let score = dto.final_score();
        let id = sqlx::query_scalar::<_, GradeId>(
            r#"INSERT INTO grades
                   (student_id, subject_id, term_id, daily_score, midterm_score,
                    final_exam_score, final_score, letter_grade, note, recorded_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id"#,
        )
        .bind(dto.student_id)
        .bind(dto.subject_id)
        .bind(dto.term_id)
        .bind(dto.daily_score)
        .bind(dto.midterm_score)
        .bind(dto.final_exam_score)
        .bind(score)
        .bind(GradeLetter::from_score(score))
        .bind(&dto.note)
        .bind(recorded_by)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            AppError::from_db_constraint(
                e,
                "Grade already recorded for this student, subject and term",
            )
        })?;

        track_grade_write("create");
        info!(grade_id = %id, final_score = score, "grade recorded");

        Self::fetch_grade(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_grades(
        db: &PgPool,
        filters: GradeFilterParams,
    ) -> Result<PaginatedGradesResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid IS NULL OR g.student_id = $1)
              AND ($2::uuid IS NULL OR g.subject_id = $2)
              AND ($3::uuid IS NULL OR g.term_id = $3)
              AND ($4::uuid IS NULL OR st.class_id = $4)"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM grades g JOIN students st ON st.id = g.student_id {FILTER}"
        ))
        .bind(filters.student_id)
        .bind(filters.subject_id)
        .bind(filters.term_id)
        .bind(filters.class_id)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Grade>(&format!(
            "{GRADE_SELECT} {FILTER} ORDER BY st.full_name, su.name LIMIT $5 OFFSET $6"
        ))
        .bind(filters.student_id)
        .bind(filters.subject_id)
        .bind(filters.term_id)
        .bind(filters.class_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedGradesResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_grade(db: &PgPool, id: GradeId) -> Result<Grade, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_grade(&mut conn, id).await
    }

    /// Merges the supplied components over the stored ones and recomputes
    /// the final score and band.
    #[instrument(skip(db))]
    pub async fn update_grade(
        db: &PgPool,
        id: GradeId,
        dto: UpdateGradeDto,
        recorded_by: UserId,
    ) -> Result<Grade, AppError> {
        let mut tx = db.begin().await?;

        let (daily, midterm, final_exam) = sqlx::query_as::<_, (f64, f64, f64)>(
            r#"SELECT daily_score, midterm_score, final_exam_score
               FROM grades WHERE id = $1 FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))?;

        let daily = dto.daily_score.unwrap_or(daily);
        let midterm = dto.midterm_score.unwrap_or(midterm);
        let final_exam = dto.final_exam_score.unwrap_or(final_exam);
        let score = final_score(daily, midterm, final_exam);

        sqlx::query(
            r#"UPDATE grades
               SET daily_score = $1,
                   midterm_score = $2,
                   final_exam_score = $3,
                   final_score = $4,
                   letter_grade = $5,
                   note = COALESCE($6, note),
                   recorded_by = $7,
                   updated_at = NOW()
               WHERE id = $8"#,
        )
        .bind(daily)
        .bind(midterm)
        .bind(final_exam)
        .bind(score)
        .bind(GradeLetter::from_score(score))
        .bind(&dto.note)
        .bind(recorded_by)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let grade = Self::fetch_grade(&mut tx, id).await?;
        tx.commit().await?;

        track_grade_write("update");
        Ok(grade)
    }

    #[instrument(skip(db))]
    pub async fn delete_grade(db: &PgPool, id: GradeId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Grade not found")));
        }

        track_grade_write("delete");
        Ok(())
    }

    /// Grades of one student in one term with their average, overall band
    /// and attendance recap.
    #[instrument(skip(db))]
    pub async fn report_card(
        db: &PgPool,
        student_id: StudentId,
        term_id: TermId,
    ) -> Result<ReportCard, AppError> {
        let header = sqlx::query_as::<_, ReportCardHeader>(
            r#"SELECT st.student_number, st.full_name AS student_name, c.name AS class_name
               FROM students st
               LEFT JOIN classes c ON c.id = st.class_id
               WHERE st.id = $1"#,
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let (term_name, academic_year) = sqlx::query_as::<_, (String, String)>(
            "SELECT name, academic_year FROM terms WHERE id = $1",
        )
        .bind(term_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Term not found")))?;

        let grades = sqlx::query_as::<_, Grade>(&format!(
            "{GRADE_SELECT} WHERE g.student_id = $1 AND g.term_id = $2 ORDER BY su.name"
        ))
        .bind(student_id)
        .bind(term_id)
        .fetch_all(db)
        .await?;

        let attendance = AttendanceService::student_recap(
            db,
            student_id,
            StudentRecapQuery {
                term_id: Some(term_id),
                ..Default::default()
            },
        )
        .await?;

        let scores: Vec<f64> = grades.iter().map(|g| g.final_score).collect();
        let summary = summarize(&scores);

        Ok(ReportCard {
            student_id,
            student_number: header.student_number,
            student_name: header.student_name,
            class_name: header.class_name,
            term_id,
            term_name,
            academic_year,
            subject_count: grades.len(),
            average_score: summary.map(|(average, _)| average),
            overall_grade: summary.map(|(_, letter)| letter),
            grades,
            attendance,
        })
    }
}
