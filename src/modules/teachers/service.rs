use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{TeacherId, system_roles};

use crate::modules::teachers::model::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
use crate::modules::users::service::UserService;

pub(crate) const TEACHER_SELECT: &str = r#"SELECT
        t.id, t.user_id, t.employee_number, t.full_name, u.email, t.phone,
        t.created_at, t.updated_at
    FROM teachers t
    JOIN users u ON u.id = t.user_id"#;

pub struct TeacherService;

impl TeacherService {
    /// Creates the login account and the profile in one transaction.
    #[instrument(skip(db, dto), fields(employee_number = %dto.employee_number))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let role_id = dto.role_id.unwrap_or(system_roles::TEACHER);
        let is_teaching = system_roles::get_slug(&role_id)
            .map(system_roles::is_teaching_role)
            .unwrap_or(false);
        if !is_teaching {
            return Err(AppError::bad_request(anyhow!(
                "Teachers must hold the teacher or homeroom_teacher role"
            )));
        }

        let mut tx = db.begin().await?;

        let user_id = UserService::insert_user(
            &mut tx,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            role_id,
        )
        .await?;

        let id = sqlx::query_scalar::<_, TeacherId>(
            r#"INSERT INTO teachers (user_id, employee_number, full_name, phone)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(&dto.employee_number)
        .bind(format!("{} {}", dto.first_name, dto.last_name))
        .bind(&dto.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Employee number already exists"))?;

        tx.commit().await?;
        info!(teacher_id = %id, "teacher created");

        Self::get_teacher(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        filters: TeacherFilterParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::text IS NULL
                OR t.full_name ILIKE '%' || $1 || '%'
                OR t.employee_number ILIKE '%' || $1 || '%'
                OR u.email ILIKE '%' || $1 || '%')"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM teachers t JOIN users u ON u.id = t.user_id {FILTER}"
        ))
        .bind(&filters.search)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Teacher>(&format!(
            "{TEACHER_SELECT} {FILTER} ORDER BY t.full_name LIMIT $2 OFFSET $3"
        ))
        .bind(&filters.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedTeachersResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: TeacherId) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(&format!("{TEACHER_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let result = sqlx::query(
            r#"UPDATE teachers
               SET employee_number = COALESCE($1, employee_number),
                   full_name = COALESCE($2, full_name),
                   phone = COALESCE($3, phone),
                   updated_at = NOW()
               WHERE id = $4"#,
        )
        .bind(&dto.employee_number)
        .bind(&dto.full_name)
        .bind(&dto.phone)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Employee number already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        Self::get_teacher(db, id).await
    }

    /// Removes the teacher's account; the profile goes with it.
    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: TeacherId) -> Result<(), AppError> {
        let teacher = Self::get_teacher(db, id).await?;

        let slots =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedules WHERE teacher_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        if slots > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete teacher assigned to {} schedule slot(s)",
                slots
            )));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(teacher.user_id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "Teacher is assigned to schedule slots"))?;

        Ok(())
    }
}
