//! Role checks.
//!
//! Fine-grained access goes through the permission extractors in
//! [`super::auth`]. Role checks are for the few places where the role itself
//! decides the outcome: the admin-only user routes, and resolving whose
//! records the `/me` routes show.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use classbook_core::AppError;
use classbook_models::StudentId;
use classbook_models::system_roles::slugs;

use crate::middleware::auth::AuthUser;
use crate::modules::parents::service::ParentService;
use crate::modules::students::service::StudentService;
use crate::state::AppState;

pub fn has_role(auth_user: &AuthUser, roles: &[&str]) -> bool {
    roles.contains(&auth_user.role())
}

pub fn is_admin(auth_user: &AuthUser) -> bool {
    auth_user.role() == slugs::ADMIN
}

pub fn is_teacher(auth_user: &AuthUser) -> bool {
    has_role(auth_user, &[slugs::TEACHER, slugs::HOMEROOM_TEACHER])
}

pub fn is_student(auth_user: &AuthUser) -> bool {
    auth_user.role() == slugs::STUDENT
}

pub fn is_parent(auth_user: &AuthUser) -> bool {
    auth_user.role() == slugs::PARENT
}

/// Student whose grades and attendance a `/me` route shows. A student always
/// gets themself; a parent gets `requested` if it is their child, or their
/// first child by name.
pub async fn resolve_own_student(
    db: &PgPool,
    auth_user: &AuthUser,
    requested: Option<StudentId>,
) -> Result<StudentId, AppError> {
    let user_id = auth_user.user_id()?;

    if is_student(auth_user) {
        StudentService::student_for_user(db, user_id).await
    } else if is_parent(auth_user) {
        ParentService::child_for_user(db, user_id, requested).await
    } else {
        Err(AppError::forbidden(
            "Only students and parents have personal records",
        ))
    }
}

pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed_roles: &[&str],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;

    if !has_role(&auth_user, allowed_roles) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}",
            allowed_roles.join(", ")
        )));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Route layer for admin-only routers.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/users", init_users_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, &[slugs::ADMIN]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbook_auth::Claims;

    fn user_with_role(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "someone@school.test".into(),
            role: role.into(),
            permissions: vec![],
            exp: 9999999999,
            iat: 0,
        })
    }

    #[test]
    fn test_role_helpers() {
        assert!(is_admin(&user_with_role("admin")));
        assert!(!is_admin(&user_with_role("principal")));
        assert!(is_teacher(&user_with_role("teacher")));
        assert!(is_teacher(&user_with_role("homeroom_teacher")));
        assert!(!is_teacher(&user_with_role("student")));
        assert!(is_student(&user_with_role("student")));
        assert!(is_parent(&user_with_role("parent")));
        assert!(!is_parent(&user_with_role("student")));
    }

    #[test]
    fn test_has_role() {
        let principal = user_with_role("principal");
        assert!(has_role(&principal, &["admin", "principal"]));
        assert!(!has_role(&principal, &["teacher"]));
    }
}
