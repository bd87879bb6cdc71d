use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{ClassId, StudentId, UserId, system_roles};

use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
use crate::modules::users::service::UserService;

pub(crate) const STUDENT_SELECT: &str = r#"SELECT
        s.id, s.user_id, s.student_number, s.full_name, u.email, s.gender,
        s.date_of_birth, s.class_id, c.name AS class_name,
        s.created_at, s.updated_at
    FROM students s
    JOIN users u ON u.id = s.user_id
    LEFT JOIN classes c ON c.id = s.class_id"#;

pub struct StudentService;

impl StudentService {
    async fn ensure_class_exists(conn: &mut PgConnection, class_id: ClassId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(class_id)
                .fetch_one(conn)
                .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow!("Class not found")));
        }
        Ok(())
    }

    /// Creates the login account and the profile in one transaction.
    #[instrument(skip(db, dto), fields(student_number = %dto.student_number))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(&mut tx, class_id).await?;
        }

        let user_id = UserService::insert_user(
            &mut tx,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            system_roles::STUDENT,
        )
        .await?;

        let id = sqlx::query_scalar::<_, StudentId>(
            r#"INSERT INTO students
                   (user_id, student_number, full_name, gender, date_of_birth, class_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(&dto.student_number)
        .bind(format!("{} {}", dto.first_name, dto.last_name))
        .bind(dto.gender)
        .bind(dto.date_of_birth)
        .bind(dto.class_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Student number already exists"))?;

        tx.commit().await?;
        info!(student_id = %id, "student created");

        Self::get_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid IS NULL OR s.class_id = $1)
              AND ($2::text IS NULL
                OR s.full_name ILIKE '%' || $2 || '%'
                OR s.student_number ILIKE '%' || $2 || '%')"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM students s {FILTER}"))
                .bind(filters.class_id)
                .bind(&filters.search)
                .fetch_one(db)
                .await?;

        let data = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT} {FILTER} ORDER BY s.full_name LIMIT $3 OFFSET $4"
        ))
        .bind(filters.class_id)
        .bind(&filters.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedStudentsResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// Profile of a logged-in student.
    #[instrument(skip(db))]
    pub async fn student_for_user(db: &PgPool, user_id: UserId) -> Result<StudentId, AppError> {
        sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut conn = db.acquire().await?;

        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(&mut conn, class_id).await?;
        }

        let result = sqlx::query(
            r#"UPDATE students
               SET full_name = COALESCE($1, full_name),
                   gender = COALESCE($2, gender),
                   date_of_birth = COALESCE($3, date_of_birth),
                   class_id = COALESCE($4, class_id),
                   updated_at = NOW()
               WHERE id = $5"#,
        )
        .bind(&dto.full_name)
        .bind(dto.gender)
        .bind(dto.date_of_birth)
        .bind(dto.class_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        drop(conn);
        Self::get_student(db, id).await
    }

    /// Removes the student's account; the profile and its attendance go with it.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let student = Self::get_student(db, id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(student.user_id)
            .execute(db)
            .await?;

        Ok(())
    }
}
