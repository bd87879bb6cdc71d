use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use classbook_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use classbook_config::JwtConfig;
use classbook_core::{AppError, hash_password, permissions, verify_password};
use classbook_models::UserId;

use crate::metrics::{track_user_login_failure, track_user_login_success};
use crate::modules::auth::model::{ChangePasswordDto, LoginRequest, LoginResponse, MeResponse};
use crate::modules::users::model::User;
use crate::modules::users::service::{USER_SELECT, UserService};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    fn issue_tokens(user: User, jwt_config: &JwtConfig) -> Result<LoginResponse, AppError> {
        let access_token = create_access_token(
            user.id.into_inner(),
            user.email.as_str(),
            &user.role,
            permissions::for_role(&user.role),
            jwt_config,
        )?;
        let refresh_token =
            create_refresh_token(user.id.into_inner(), user.email.as_str(), jwt_config)?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let row = sqlx::query_as::<_, (UserId, String)>(
            "SELECT id, password FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some((user_id, password_hash)) = row else {
            track_user_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &password_hash)? {
            track_user_login_failure("wrong_password");
            warn!(%user_id, "login with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let user = UserService::get_user(db, user_id).await?;
        if !user.is_active {
            track_user_login_failure("inactive");
            return Err(AppError::forbidden("Account is deactivated"));
        }

        track_user_login_success(&user.role);
        info!(%user_id, role = %user.role, "user logged in");
        Self::issue_tokens(user, jwt_config)
    }

    #[instrument(skip_all)]
    pub async fn refresh_tokens(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        Self::issue_tokens(user, jwt_config)
    }

    #[instrument(skip(db))]
    pub async fn me(db: &PgPool, user_id: UserId) -> Result<MeResponse, AppError> {
        let user = UserService::get_user(db, user_id).await?;
        let permissions = permissions::for_role(&user.role);
        Ok(MeResponse { user, permissions })
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: UserId,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }
        if dto.current_password == dto.new_password {
            return Err(AppError::bad_request(anyhow!(
                "New password must differ from the current one"
            )));
        }

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(hash_password(&dto.new_password)?)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }
}
