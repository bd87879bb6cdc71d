use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use classbook_config::RateLimitConfig;

use crate::state::AppState;

use super::controller::{change_password, get_me, login_user, refresh_token};

/// Routes: POST /login, POST /refresh, GET /me, POST /change-password
///
/// Login and refresh are throttled per client IP when rate limiting is on.
pub fn init_auth_router(rate_limit: &RateLimitConfig) -> anyhow::Result<Router<AppState>> {
    let mut public = Router::new()
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token));

    if rate_limit.enabled {
        let config = Arc::new(rate_limit.auth_governor_config()?);
        public = public.layer(GovernorLayer::new(config));
    }

    Ok(public
        .route("/me", get(get_me))
        .route("/change-password", post(change_password)))
}
