use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_term, create_term, delete_term, get_active_term, get_term, get_terms, update_term,
};

/// Routes: GET/POST /, GET /active, GET/PUT/DELETE /{id}, POST /{id}/activate
pub fn init_terms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_terms).post(create_term))
        .route("/active", get(get_active_term))
        .route("/{id}", get(get_term).put(update_term).delete(delete_term))
        .route("/{id}/activate", post(activate_term))
}
