use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{ParentId, StudentId, UserId, system_roles};

use crate::modules::parents::model::{
    CreateParentDto, LinkChildDto, PaginatedParentsResponse, Parent, ParentChild,
    ParentFilterParams, ParentWithChildren, UpdateParentDto,
};
use crate::modules::users::service::UserService;

const PARENT_SELECT: &str = r#"SELECT
        p.id, p.user_id, p.full_name, u.email, p.phone, p.occupation, p.address,
        p.created_at, p.updated_at
    FROM parents p
    JOIN users u ON u.id = p.user_id"#;

const CHILD_SELECT: &str = r#"SELECT
        st.id AS student_id, st.student_number, st.full_name,
        st.class_id, c.name AS class_name, ps.relationship
    FROM parent_students ps
    JOIN students st ON st.id = ps.student_id
    LEFT JOIN classes c ON c.id = st.class_id"#;

pub struct ParentService;

impl ParentService {
    async fn children_of(
        conn: &mut PgConnection,
        parent_id: ParentId,
    ) -> Result<Vec<ParentChild>, AppError> {
        let children = sqlx::query_as::<_, ParentChild>(&format!(
            "{CHILD_SELECT} WHERE ps.parent_id = $1 ORDER BY st.full_name, st.id"
        ))
        .bind(parent_id)
        .fetch_all(conn)
        .await?;
        Ok(children)
    }

    /// Creates the login account and the profile in one transaction.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_parent(
        db: &PgPool,
        dto: CreateParentDto,
    ) -> Result<ParentWithChildren, AppError> {
        let mut tx = db.begin().await?;

        let user_id = UserService::insert_user(
            &mut tx,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            system_roles::PARENT,
        )
        .await?;

        let id = sqlx::query_scalar::<_, ParentId>(
            r#"INSERT INTO parents (user_id, full_name, phone, occupation, address)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(format!("{} {}", dto.first_name, dto.last_name))
        .bind(&dto.phone)
        .bind(&dto.occupation)
        .bind(&dto.address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(parent_id = %id, "parent created");

        Self::get_parent(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_parents(
        db: &PgPool,
        filters: ParentFilterParams,
    ) -> Result<PaginatedParentsResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::text IS NULL
                OR p.full_name ILIKE '%' || $1 || '%'
                OR p.phone ILIKE '%' || $1 || '%')"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM parents p {FILTER}"))
                .bind(&filters.search)
                .fetch_one(db)
                .await?;

        let data = sqlx::query_as::<_, Parent>(&format!(
            "{PARENT_SELECT} {FILTER} ORDER BY p.full_name LIMIT $2 OFFSET $3"
        ))
        .bind(&filters.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedParentsResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_parent(db: &PgPool, id: ParentId) -> Result<ParentWithChildren, AppError> {
        let mut conn = db.acquire().await?;

        let parent = sqlx::query_as::<_, Parent>(&format!("{PARENT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Parent not found")))?;

        let children = Self::children_of(&mut conn, id).await?;
        Ok(ParentWithChildren { parent, children })
    }

    #[instrument(skip(db))]
    pub async fn update_parent(
        db: &PgPool,
        id: ParentId,
        dto: UpdateParentDto,
    ) -> Result<ParentWithChildren, AppError> {
        let result = sqlx::query(
            r#"UPDATE parents
               SET full_name = COALESCE($1, full_name),
                   phone = COALESCE($2, phone),
                   occupation = COALESCE($3, occupation),
                   address = COALESCE($4, address),
                   updated_at = NOW()
               WHERE id = $5"#,
        )
        .bind(&dto.full_name)
        .bind(&dto.phone)
        .bind(&dto.occupation)
        .bind(&dto.address)
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Parent not found")));
        }

        Self::get_parent(db, id).await
    }

    /// Removes the parent's account; the profile and child links go with it.
    #[instrument(skip(db))]
    pub async fn delete_parent(db: &PgPool, id: ParentId) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM users WHERE id = (SELECT user_id FROM parents WHERE id = $1)",
        )
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Parent not found")));
        }
        Ok(())
    }

    /// Links a student to the parent. Linking again replaces the relationship.
    #[instrument(skip(db))]
    pub async fn link_child(
        db: &PgPool,
        id: ParentId,
        dto: LinkChildDto,
    ) -> Result<ParentWithChildren, AppError> {
        let (parent_exists, student_exists) = sqlx::query_as::<_, (bool, bool)>(
            r#"SELECT
                EXISTS(SELECT 1 FROM parents WHERE id = $1),
                EXISTS(SELECT 1 FROM students WHERE id = $2)"#,
        )
        .bind(id)
        .bind(dto.student_id)
        .fetch_one(db)
        .await?;

        if !parent_exists {
            return Err(AppError::not_found(anyhow!("Parent not found")));
        }
        if !student_exists {
            return Err(AppError::bad_request(anyhow!("Student not found")));
        }

        sqlx::query(
            r#"INSERT INTO parent_students (parent_id, student_id, relationship)
               VALUES ($1, $2, $3)
               ON CONFLICT (parent_id, student_id) DO UPDATE
               SET relationship = EXCLUDED.relationship"#,
        )
        .bind(id)
        .bind(dto.student_id)
        .bind(dto.relationship)
        .execute(db)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Student is already linked"))?;

        info!(parent_id = %id, student_id = %dto.student_id, "child linked");
        Self::get_parent(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn unlink_child(
        db: &PgPool,
        id: ParentId,
        student_id: StudentId,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM parent_students WHERE parent_id = $1 AND student_id = $2")
                .bind(id)
                .bind(student_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "Student is not linked to this parent"
            )));
        }
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn parent_for_user(db: &PgPool, user_id: UserId) -> Result<ParentId, AppError> {
        sqlx::query_scalar::<_, ParentId>("SELECT id FROM parents WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Parent profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn children_for_user(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<ParentChild>, AppError> {
        let parent_id = Self::parent_for_user(db, user_id).await?;
        let mut conn = db.acquire().await?;
        Self::children_of(&mut conn, parent_id).await
    }

    /// The child a parent's `/me` request is about: `requested` when it is
    /// one of theirs, otherwise the first child by name.
    #[instrument(skip(db))]
    pub async fn child_for_user(
        db: &PgPool,
        user_id: UserId,
        requested: Option<StudentId>,
    ) -> Result<StudentId, AppError> {
        let parent_id = Self::parent_for_user(db, user_id).await?;

        match requested {
            Some(student_id) => {
                let linked = sqlx::query_scalar::<_, bool>(
                    r#"SELECT EXISTS(
                        SELECT 1 FROM parent_students WHERE parent_id = $1 AND student_id = $2
                    )"#,
                )
                .bind(parent_id)
                .bind(student_id)
                .fetch_one(db)
                .await?;

                if !linked {
                    return Err(AppError::forbidden("Student is not linked to this parent"));
                }
                Ok(student_id)
            }
            None => sqlx::query_scalar::<_, StudentId>(
                r#"SELECT st.id
                   FROM parent_students ps
                   JOIN students st ON st.id = ps.student_id
                   WHERE ps.parent_id = $1
                   ORDER BY st.full_name, st.id
                   LIMIT 1"#,
            )
            .bind(parent_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No children linked to this parent"))),
        }
    }
}
