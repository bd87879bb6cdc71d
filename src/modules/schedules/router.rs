use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    bulk_create_schedules, create_schedule, delete_schedule, get_class_weekly, get_my_weekly,
    get_schedule, get_schedules, get_teacher_weekly, update_schedule, validate_schedule,
};

/// Routes: GET/POST /, POST /bulk, POST /validate, GET /me/weekly,
/// GET /class/{class_id}/weekly, GET /teacher/{teacher_id}/weekly,
/// GET/PUT/DELETE /{id}
pub fn init_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schedules).post(create_schedule))
        .route("/bulk", post(bulk_create_schedules))
        .route("/validate", post(validate_schedule))
        .route("/me/weekly", get(get_my_weekly))
        .route("/class/{class_id}/weekly", get(get_class_weekly))
        .route("/teacher/{teacher_id}/weekly", get(get_teacher_weekly))
        .route(
            "/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
}
