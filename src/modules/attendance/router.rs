use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    bulk_record_attendance, delete_attendance, get_attendance, get_attendance_list,
    get_class_recap, get_my_attendance, get_student_recap, record_attendance, update_attendance,
};

/// Routes: GET/POST /, POST /bulk, GET /me, GET /recap/student/{id},
/// GET /recap/class/{id}, GET/PUT/DELETE /{id}
pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_attendance_list).post(record_attendance))
        .route("/bulk", post(bulk_record_attendance))
        .route("/me", get(get_my_attendance))
        .route("/recap/student/{id}", get(get_student_recap))
        .route("/recap/class/{id}", get(get_class_recap))
        .route(
            "/{id}",
            get(get_attendance)
                .put(update_attendance)
                .delete(delete_attendance),
        )
}
