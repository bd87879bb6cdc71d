use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{ClassId, TeacherId};

use crate::modules::classes::model::{
    Class, ClassFilterParams, ClassWithStats, CreateClassDto, PaginatedClassesResponse,
    UpdateClassDto,
};
use crate::modules::students::model::Student;
use crate::modules::students::service::STUDENT_SELECT;

const CLASS_COLUMNS: &str =
    "id, name, grade_level, academic_year, homeroom_teacher_id, created_at, updated_at";

const CLASS_WITH_STATS_SELECT: &str = r#"SELECT
        c.id, c.name, c.grade_level, c.academic_year, c.homeroom_teacher_id,
        t.full_name AS homeroom_teacher_name,
        (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS student_count,
        c.created_at, c.updated_at
    FROM classes c
    LEFT JOIN teachers t ON t.id = c.homeroom_teacher_id"#;

pub struct ClassService;

impl ClassService {
    async fn ensure_teacher_exists(db: &PgPool, teacher_id: TeacherId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)")
                .bind(teacher_id)
                .fetch_one(db)
                .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow!("Homeroom teacher not found")));
        }
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<ClassWithStats, AppError> {
        if let Some(teacher_id) = dto.homeroom_teacher_id {
            Self::ensure_teacher_exists(db, teacher_id).await?;
        }

        let class = sqlx::query_as::<_, Class>(&format!(
            r#"INSERT INTO classes (name, grade_level, academic_year, homeroom_teacher_id)
               VALUES ($1, $2, $3, $4)
               RETURNING {CLASS_COLUMNS}"#
        ))
        .bind(&dto.name)
        .bind(dto.grade_level)
        .bind(&dto.academic_year)
        .bind(dto.homeroom_teacher_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            AppError::from_db_constraint(e, "A class with this name already exists for the academic year")
        })?;

        Self::get_class(db, class.id).await
    }

    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &PgPool,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::text IS NULL OR c.academic_year = $1)
              AND ($2::smallint IS NULL OR c.grade_level = $2)"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM classes c {FILTER}"))
                .bind(&filters.academic_year)
                .bind(filters.grade_level)
                .fetch_one(db)
                .await?;

        let data = sqlx::query_as::<_, ClassWithStats>(&format!(
            "{CLASS_WITH_STATS_SELECT} {FILTER} ORDER BY c.grade_level, c.name LIMIT $3 OFFSET $4"
        ))
        .bind(&filters.academic_year)
        .bind(filters.grade_level)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedClassesResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: ClassId) -> Result<ClassWithStats, AppError> {
        sqlx::query_as::<_, ClassWithStats>(&format!("{CLASS_WITH_STATS_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_class(
        db: &PgPool,
        id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<ClassWithStats, AppError> {
        if let Some(teacher_id) = dto.homeroom_teacher_id {
            Self::ensure_teacher_exists(db, teacher_id).await?;
        }

        let result = sqlx::query(
            r#"UPDATE classes
               SET name = COALESCE($1, name),
                   grade_level = COALESCE($2, grade_level),
                   homeroom_teacher_id = COALESCE($3, homeroom_teacher_id),
                   updated_at = NOW()
               WHERE id = $4"#,
        )
        .bind(&dto.name)
        .bind(dto.grade_level)
        .bind(dto.homeroom_teacher_id)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| {
            AppError::from_db_constraint(e, "A class with this name already exists for the academic year")
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Class not found")));
        }

        Self::get_class(db, id).await
    }

    /// Refuses while students or timetable slots still point at the class.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: ClassId) -> Result<(), AppError> {
        let (students, schedules) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT
                   (SELECT COUNT(*) FROM students WHERE class_id = $1),
                   (SELECT COUNT(*) FROM schedules WHERE class_id = $1)"#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if students > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete class with {} student(s)",
                students
            )));
        }
        if schedules > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete class with {} schedule slot(s)",
                schedules
            )));
        }

        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "Class is still referenced by schedules or students"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Class not found")));
        }
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_class_students(db: &PgPool, id: ClassId) -> Result<Vec<Student>, AppError> {
        Self::get_class(db, id).await?;

        let students = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT} WHERE s.class_id = $1 ORDER BY s.full_name"
        ))
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(students)
    }
}
