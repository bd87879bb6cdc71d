use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::{GradeId, StudentId};

use crate::middleware::auth::{
    AuthUser, RequireGradesDelete, RequireGradesRead, RequireGradesRecord, RequireGradesUpdate,
};
use crate::middleware::role::resolve_own_student;
use crate::modules::grades::model::{
    CreateGradeDto, Grade, GradeFilterParams, MyReportCardQuery, PaginatedGradesResponse,
    ReportCard, ReportCardQuery, UpdateGradeDto,
};
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/grades",
    summary = "Record grade",
    description = "The final score (40% daily, 30% midterm, 30% final exam) and its letter band are computed on write.",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = Grade),
        (status = 400, description = "Unknown student, subject or term"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already graded for this student, subject and term"),
        (status = 422, description = "Validation error")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_grade(
    State(state): State<AppState>,
    RequireGradesRecord(auth_user): RequireGradesRecord,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    let recorded_by = auth_user.user_id()?;
    let grade = GradeService::create_grade(&state.db, dto, recorded_by).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    get,
    path = "/api/grades",
    summary = "List grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "Grades", body = PaginatedGradesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_grades(
    State(state): State<AppState>,
    RequireGradesRead(_auth_user): RequireGradesRead,
    Query(filters): Query<GradeFilterParams>,
) -> Result<Json<PaginatedGradesResponse>, AppError> {
    Ok(Json(GradeService::get_grades(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    summary = "Get grade",
    params(("id" = String, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade", body = Grade),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_grade(
    State(state): State<AppState>,
    RequireGradesRead(_auth_user): RequireGradesRead,
    Path(id): Path<GradeId>,
) -> Result<Json<Grade>, AppError> {
    Ok(Json(GradeService::get_grade(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    summary = "Update grade",
    description = "Omitted components keep their stored value; the final score and band are recomputed.",
    params(("id" = String, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Grade not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_grade(
    State(state): State<AppState>,
    RequireGradesUpdate(auth_user): RequireGradesUpdate,
    Path(id): Path<GradeId>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<Grade>, AppError> {
    let recorded_by = auth_user.user_id()?;
    Ok(Json(
        GradeService::update_grade(&state.db, id, dto, recorded_by).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    summary = "Delete grade",
    params(("id" = String, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_grade(
    State(state): State<AppState>,
    RequireGradesDelete(_auth_user): RequireGradesDelete,
    Path(id): Path<GradeId>,
) -> Result<StatusCode, AppError> {
    GradeService::delete_grade(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/grades/report-card/{student_id}",
    summary = "Student report card",
    description = "Grades for one term with the average final score, its band and the attendance recap.",
    params(("student_id" = String, Path, description = "Student ID"), ReportCardQuery),
    responses(
        (status = 200, description = "Report card", body = ReportCard),
        (status = 400, description = "term_id missing or malformed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student or term not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_report_card(
    State(state): State<AppState>,
    RequireGradesRead(_auth_user): RequireGradesRead,
    Path(student_id): Path<StudentId>,
    Query(query): Query<ReportCardQuery>,
) -> Result<Json<ReportCard>, AppError> {
    Ok(Json(
        GradeService::report_card(&state.db, student_id, query.term_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/grades/me",
    summary = "My report card",
    description = "A student's own report card. A parent gets their child's; `student_id` picks one child.",
    params(MyReportCardQuery),
    responses(
        (status = 200, description = "Report card", body = ReportCard),
        (status = 400, description = "term_id missing or malformed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a student or parent, or not the parent's child"),
        (status = 404, description = "No profile, no linked child or unknown term")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_report_card(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<MyReportCardQuery>,
) -> Result<Json<ReportCard>, AppError> {
    let student_id = resolve_own_student(&state.db, &auth_user, query.student_id).await?;
    Ok(Json(
        GradeService::report_card(&state.db, student_id, query.term_id).await?,
    ))
}
