use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use classbook_auth::{Claims, verify_token};
use classbook_core::AppError;
use classbook_models::UserId;

use crate::state::AppState;

/// Validated bearer token of the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.permissions.iter().any(|p| p == permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }

    /// Role slug carried by the token.
    pub fn role(&self) -> &str {
        &self.0.role
    }

    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that rejects with 403 unless the token carries
/// `$permission`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = classbook_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    return Err(classbook_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

use classbook_core::permissions as perm;

require_permission!(RequireUsersCreate, perm::USERS_CREATE);
require_permission!(RequireUsersRead, perm::USERS_READ);
require_permission!(RequireUsersUpdate, perm::USERS_UPDATE);
require_permission!(RequireUsersDelete, perm::USERS_DELETE);

require_permission!(RequireTermsCreate, perm::TERMS_CREATE);
require_permission!(RequireTermsRead, perm::TERMS_READ);
require_permission!(RequireTermsUpdate, perm::TERMS_UPDATE);
require_permission!(RequireTermsDelete, perm::TERMS_DELETE);

require_permission!(RequireSubjectsCreate, perm::SUBJECTS_CREATE);
require_permission!(RequireSubjectsRead, perm::SUBJECTS_READ);
require_permission!(RequireSubjectsUpdate, perm::SUBJECTS_UPDATE);
require_permission!(RequireSubjectsDelete, perm::SUBJECTS_DELETE);

require_permission!(RequireClassesCreate, perm::CLASSES_CREATE);
require_permission!(RequireClassesRead, perm::CLASSES_READ);
require_permission!(RequireClassesUpdate, perm::CLASSES_UPDATE);
require_permission!(RequireClassesDelete, perm::CLASSES_DELETE);

require_permission!(RequireTeachersCreate, perm::TEACHERS_CREATE);
require_permission!(RequireTeachersRead, perm::TEACHERS_READ);
require_permission!(RequireTeachersUpdate, perm::TEACHERS_UPDATE);
require_permission!(RequireTeachersDelete, perm::TEACHERS_DELETE);

require_permission!(RequireStudentsCreate, perm::STUDENTS_CREATE);
require_permission!(RequireStudentsRead, perm::STUDENTS_READ);
require_permission!(RequireStudentsUpdate, perm::STUDENTS_UPDATE);
require_permission!(RequireStudentsDelete, perm::STUDENTS_DELETE);

require_permission!(RequireSchedulesCreate, perm::SCHEDULES_CREATE);
require_permission!(RequireSchedulesRead, perm::SCHEDULES_READ);
require_permission!(RequireSchedulesUpdate, perm::SCHEDULES_UPDATE);
require_permission!(RequireSchedulesDelete, perm::SCHEDULES_DELETE);

require_permission!(RequireAttendanceRecord, perm::ATTENDANCE_RECORD);
require_permission!(RequireAttendanceRead, perm::ATTENDANCE_READ);
require_permission!(RequireAttendanceUpdate, perm::ATTENDANCE_UPDATE);
require_permission!(RequireAttendanceDelete, perm::ATTENDANCE_DELETE);

require_permission!(RequireGradesRecord, perm::GRADES_RECORD);
require_permission!(RequireGradesRead, perm::GRADES_READ);
require_permission!(RequireGradesUpdate, perm::GRADES_UPDATE);
require_permission!(RequireGradesDelete, perm::GRADES_DELETE);

require_permission!(RequireParentsCreate, perm::PARENTS_CREATE);
require_permission!(RequireParentsRead, perm::PARENTS_READ);
require_permission!(RequireParentsUpdate, perm::PARENTS_UPDATE);
require_permission!(RequireParentsDelete, perm::PARENTS_DELETE);
