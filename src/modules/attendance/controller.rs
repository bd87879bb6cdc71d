use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::{AttendanceId, ClassId, StudentId};

use crate::middleware::auth::{
    AuthUser, RequireAttendanceDelete, RequireAttendanceRead, RequireAttendanceRecord,
    RequireAttendanceUpdate,
};
use crate::middleware::role::resolve_own_student;
use crate::modules::attendance::model::{
    Attendance, AttendanceFilterParams, AttendanceRecap, BulkAttendanceDto,
    BulkAttendanceResponse, ClassAttendanceRecap, ClassRecapQuery, MyAttendanceQuery,
    PaginatedAttendanceResponse, RecordAttendanceDto, StudentRecapQuery, UpdateAttendanceDto,
};
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/attendance",
    summary = "Record attendance",
    request_body = RecordAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Unknown slot or student, or student not in the slot's class"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already recorded for this student, slot and date"),
        (status = 422, description = "Validation error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn record_attendance(
    State(state): State<AppState>,
    RequireAttendanceRecord(auth_user): RequireAttendanceRecord,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let recorded_by = auth_user.user_id()?;
    let attendance = AttendanceService::record_attendance(&state.db, dto, recorded_by).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    summary = "Record attendance for a whole slot",
    description = "Upserts one entry per student for the given slot and date.",
    request_body = BulkAttendanceDto,
    responses(
        (status = 201, description = "Every entry recorded", body = BulkAttendanceResponse),
        (status = 207, description = "Some entries failed; see per-student results", body = BulkAttendanceResponse),
        (status = 400, description = "Schedule not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_record_attendance(
    State(state): State<AppState>,
    RequireAttendanceRecord(auth_user): RequireAttendanceRecord,
    ValidatedJson(dto): ValidatedJson<BulkAttendanceDto>,
) -> Result<(StatusCode, Json<BulkAttendanceResponse>), AppError> {
    let recorded_by = auth_user.user_id()?;
    let response = AttendanceService::bulk_record(&state.db, dto, recorded_by).await?;
    let status = if response.failed == 0 {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    summary = "List attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Attendance records", body = PaginatedAttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_attendance_list(
    State(state): State<AppState>,
    RequireAttendanceRead(_auth_user): RequireAttendanceRead,
    Query(filters): Query<AttendanceFilterParams>,
) -> Result<Json<PaginatedAttendanceResponse>, AppError> {
    Ok(Json(
        AttendanceService::get_attendance_list(&state.db, filters).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    summary = "Get attendance record",
    params(("id" = String, Path, description = "Attendance ID")),
    responses(
        (status = 200, description = "Attendance record", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_attendance(
    State(state): State<AppState>,
    RequireAttendanceRead(_auth_user): RequireAttendanceRead,
    Path(id): Path<AttendanceId>,
) -> Result<Json<Attendance>, AppError> {
    Ok(Json(AttendanceService::get_attendance(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    summary = "Update attendance record",
    params(("id" = String, Path, description = "Attendance ID")),
    request_body = UpdateAttendanceDto,
    responses(
        (status = 200, description = "Attendance updated", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_attendance(
    State(state): State<AppState>,
    RequireAttendanceUpdate(auth_user): RequireAttendanceUpdate,
    Path(id): Path<AttendanceId>,
    ValidatedJson(dto): ValidatedJson<UpdateAttendanceDto>,
) -> Result<Json<Attendance>, AppError> {
    let recorded_by = auth_user.user_id()?;
    Ok(Json(
        AttendanceService::update_attendance(&state.db, id, dto, recorded_by).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    summary = "Delete attendance record",
    params(("id" = String, Path, description = "Attendance ID")),
    responses(
        (status = 204, description = "Attendance deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    RequireAttendanceDelete(_auth_user): RequireAttendanceDelete,
    Path(id): Path<AttendanceId>,
) -> Result<StatusCode, AppError> {
    AttendanceService::delete_attendance(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/attendance/recap/student/{id}",
    summary = "Student attendance recap",
    description = "Counts per status and the presence percentage, optionally limited to a term and a date range.",
    params(("id" = String, Path, description = "Student ID"), StudentRecapQuery),
    responses(
        (status = 200, description = "Recap", body = AttendanceRecap),
        (status = 400, description = "date_from is after date_to"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_recap(
    State(state): State<AppState>,
    RequireAttendanceRead(_auth_user): RequireAttendanceRead,
    Path(id): Path<StudentId>,
    Query(query): Query<StudentRecapQuery>,
) -> Result<Json<AttendanceRecap>, AppError> {
    Ok(Json(
        AttendanceService::student_recap(&state.db, id, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/attendance/recap/class/{id}",
    summary = "Class attendance recap",
    description = "One recap row per student of the class for the given term.",
    params(("id" = String, Path, description = "Class ID"), ClassRecapQuery),
    responses(
        (status = 200, description = "Recap per student", body = ClassAttendanceRecap),
        (status = 400, description = "term_id missing or malformed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class_recap(
    State(state): State<AppState>,
    RequireAttendanceRead(_auth_user): RequireAttendanceRead,
    Path(id): Path<ClassId>,
    Query(query): Query<ClassRecapQuery>,
) -> Result<Json<ClassAttendanceRecap>, AppError> {
    Ok(Json(
        AttendanceService::class_recap(&state.db, id, query.term_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/attendance/me",
    summary = "My attendance recap",
    description = "A student's own recap for the term. A parent gets their child's; `student_id` picks one child.",
    params(MyAttendanceQuery),
    responses(
        (status = 200, description = "Recap", body = AttendanceRecap),
        (status = 400, description = "term_id missing or malformed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a student or parent, or not the parent's child"),
        (status = 404, description = "No profile or no linked child")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<MyAttendanceQuery>,
) -> Result<Json<AttendanceRecap>, AppError> {
    let student_id = resolve_own_student(&state.db, &auth_user, query.student_id).await?;
    let filters = StudentRecapQuery {
        term_id: Some(query.term_id),
        ..Default::default()
    };
    Ok(Json(
        AttendanceService::student_recap(&state.db, student_id, filters).await?,
    ))
}
