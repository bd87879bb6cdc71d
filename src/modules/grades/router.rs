use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_grade, delete_grade, get_grade, get_grades, get_my_report_card, get_report_card,
    update_grade,
};

/// Routes: GET/POST /, GET /me, GET /report-card/{student_id},
/// GET/PUT/DELETE /{id}
pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades).post(create_grade))
        .route("/me", get(get_my_report_card))
        .route("/report-card/{student_id}", get(get_report_card))
        .route(
            "/{id}",
            get(get_grade).put(update_grade).delete(delete_grade),
        )
}
