use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use classbook_core::{AppError, PaginationMeta, hash_password};
use classbook_models::{Email, RoleId, UserId, system_roles};

use crate::metrics::track_user_created;
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};

pub(crate) const USER_SELECT: &str = r#"SELECT
        u.id, u.first_name, u.last_name, u.email, u.role_id, r.slug AS role,
        u.is_active, u.created_at, u.updated_at
    FROM users u
    JOIN roles r ON r.id = u.role_id"#;

pub struct UserService;

impl UserService {
    /// Inserts an account on an open connection so callers creating a
    /// teacher or student can do it in the same transaction.
    pub(crate) async fn insert_user(
        conn: &mut PgConnection,
        first_name: &str,
        last_name: &str,
        email: &Email,
        password: &str,
        role_id: RoleId,
    ) -> Result<UserId, AppError> {
        if system_roles::get_slug(&role_id).is_none() {
            return Err(AppError::bad_request(anyhow!("Unknown role")));
        }

        let hashed_password = hash_password(password)?;

        let id = sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (first_name, last_name, email, password, role_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(&hashed_password)
        .bind(role_id)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Email already exists"))?;

        if let Some(slug) = system_roles::get_slug(&role_id) {
            track_user_created(slug);
        }

        Ok(id)
    }

    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let mut conn = db.acquire().await?;
        let id = Self::insert_user(
            &mut conn,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            dto.role_id,
        )
        .await?;

        Self::get_user(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid IS NULL OR u.role_id = $1)
              AND ($2::text IS NULL
                   OR u.first_name ILIKE '%' || $2 || '%'
                   OR u.last_name ILIKE '%' || $2 || '%'
                   OR u.email ILIKE '%' || $2 || '%')"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users u {FILTER}"))
            .bind(filters.role_id)
            .bind(&filters.search)
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, User>(&format!(
            "{USER_SELECT} {FILTER} ORDER BY u.last_name, u.first_name, u.id LIMIT $3 OFFSET $4"
        ))
        .bind(filters.role_id)
        .bind(&filters.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsersResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_user(
        db: &PgPool,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        if let Some(role_id) = dto.role_id
            && system_roles::get_slug(&role_id).is_none()
        {
            return Err(AppError::bad_request(anyhow!("Unknown role")));
        }

        let result = sqlx::query(
            r#"UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email),
                role_id = COALESCE($4, role_id),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
               WHERE id = $6"#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(dto.role_id)
        .bind(dto.is_active)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Email already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        Self::get_user(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "User is still referenced by other records"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        Ok(())
    }
}
