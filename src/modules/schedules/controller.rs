use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::{ClassId, ScheduleId, TeacherId};
use classbook_scheduling::{ConflictReport, ScheduleOwner};

use crate::middleware::auth::{
    AuthUser, RequireSchedulesCreate, RequireSchedulesDelete, RequireSchedulesRead,
    RequireSchedulesUpdate,
};
use crate::middleware::role::{is_student, is_teacher};
use crate::modules::schedules::model::{
    BulkCreateScheduleDto, BulkScheduleResponse, CreateScheduleDto, PaginatedSchedulesResponse,
    ScheduleFilterParams, ScheduleSlot, UpdateScheduleDto, ValidateScheduleDto,
    WeeklyScheduleQuery, WeeklyTimetableResponse,
};
use crate::modules::schedules::service::ScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/schedules",
    summary = "List schedule slots",
    params(ScheduleFilterParams),
    responses(
        (status = 200, description = "Slots ordered by day and start time", body = PaginatedSchedulesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:read permission")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_schedules(
    State(state): State<AppState>,
    RequireSchedulesRead(_auth_user): RequireSchedulesRead,
    Query(filters): Query<ScheduleFilterParams>,
) -> Result<Json<PaginatedSchedulesResponse>, AppError> {
    let schedules = ScheduleService::get_schedules(&state.db, filters).await?;
    Ok(Json(schedules))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    summary = "Get schedule slot",
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Slot with class, teacher and subject names", body = ScheduleSlot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:read permission"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    RequireSchedulesRead(_auth_user): RequireSchedulesRead,
    Path(id): Path<ScheduleId>,
) -> Result<Json<ScheduleSlot>, AppError> {
    let schedule = ScheduleService::get_schedule(&state.db, id).await?;
    Ok(Json(schedule))
}

/// Book a slot. Rejected with 409 if the teacher or the class is already
/// booked at an overlapping time on that day of the term.
#[utoipa::path(
    post,
    path = "/api/schedules",
    summary = "Create schedule slot",
    request_body = CreateScheduleDto,
    responses(
        (status = 201, description = "Slot created", body = ScheduleSlot),
        (status = 400, description = "Start not before end, or unknown class/teacher/subject/term"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:create permission"),
        (status = 409, description = "Conflicts with existing slots; report under `details`", body = ConflictReport),
        (status = 422, description = "Validation error")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_schedule(
    State(state): State<AppState>,
    RequireSchedulesCreate(_auth_user): RequireSchedulesCreate,
    ValidatedJson(dto): ValidatedJson<CreateScheduleDto>,
) -> Result<(StatusCode, Json<ScheduleSlot>), AppError> {
    let schedule = ScheduleService::create_schedule(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    summary = "Update schedule slot",
    params(("id" = String, Path, description = "Schedule ID")),
    request_body = UpdateScheduleDto,
    responses(
        (status = 200, description = "Slot updated", body = ScheduleSlot),
        (status = 400, description = "Start not before end, or unknown teacher/subject"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:update permission"),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "Conflicts with other slots", body = ConflictReport)
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_schedule(
    State(state): State<AppState>,
    RequireSchedulesUpdate(_auth_user): RequireSchedulesUpdate,
    Path(id): Path<ScheduleId>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleDto>,
) -> Result<Json<ScheduleSlot>, AppError> {
    let schedule = ScheduleService::update_schedule(&state.db, id, dto).await?;
    Ok(Json(schedule))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    summary = "Delete schedule slot",
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 400, description = "Attendance has been recorded for this slot"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:delete permission"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    RequireSchedulesDelete(_auth_user): RequireSchedulesDelete,
    Path(id): Path<ScheduleId>,
) -> Result<StatusCode, AppError> {
    ScheduleService::delete_schedule(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create up to 50 slots. Items are processed in order and independently.
#[utoipa::path(
    post,
    path = "/api/schedules/bulk",
    summary = "Bulk create schedule slots",
    request_body = BulkCreateScheduleDto,
    responses(
        (status = 201, description = "All slots created", body = BulkScheduleResponse),
        (status = 207, description = "Some slots failed; see per-item results", body = BulkScheduleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:create permission"),
        (status = 422, description = "Empty or more than 50 items")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_create_schedules(
    State(state): State<AppState>,
    RequireSchedulesCreate(_auth_user): RequireSchedulesCreate,
    ValidatedJson(dto): ValidatedJson<BulkCreateScheduleDto>,
) -> Result<(StatusCode, Json<BulkScheduleResponse>), AppError> {
    let response = ScheduleService::bulk_create(&state.db, dto).await?;
    let status = if response.failed == 0 {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(response)))
}

/// Check a proposed slot without saving it. Pass `exclude_id` to check a
/// move of an existing slot.
#[utoipa::path(
    post,
    path = "/api/schedules/validate",
    summary = "Check schedule conflicts",
    request_body = ValidateScheduleDto,
    responses(
        (status = 200, description = "Conflict report", body = ConflictReport),
        (status = 400, description = "Start not before end"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:read permission")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn validate_schedule(
    State(state): State<AppState>,
    RequireSchedulesRead(_auth_user): RequireSchedulesRead,
    ValidatedJson(dto): ValidatedJson<ValidateScheduleDto>,
) -> Result<Json<ConflictReport>, AppError> {
    let report = ScheduleService::validate_schedule(&state.db, dto).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/schedules/class/{class_id}/weekly",
    summary = "Weekly timetable of a class",
    params(
        ("class_id" = String, Path, description = "Class ID"),
        WeeklyScheduleQuery
    ),
    responses(
        (status = 200, description = "Slots grouped by day name", body = WeeklyTimetableResponse),
        (status = 400, description = "Missing term_id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:read permission"),
        (status = 404, description = "Class or term not found")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class_weekly(
    State(state): State<AppState>,
    RequireSchedulesRead(_auth_user): RequireSchedulesRead,
    Path(class_id): Path<ClassId>,
    Query(query): Query<WeeklyScheduleQuery>,
) -> Result<Json<WeeklyTimetableResponse>, AppError> {
    let weekly =
        ScheduleService::get_weekly(&state.db, ScheduleOwner::Class(class_id), query.term_id)
            .await?;
    Ok(Json(weekly))
}

#[utoipa::path(
    get,
    path = "/api/schedules/teacher/{teacher_id}/weekly",
    summary = "Weekly timetable of a teacher",
    params(
        ("teacher_id" = String, Path, description = "Teacher ID"),
        WeeklyScheduleQuery
    ),
    responses(
        (status = 200, description = "Slots grouped by day name", body = WeeklyTimetableResponse),
        (status = 400, description = "Missing term_id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires schedules:read permission"),
        (status = 404, description = "Teacher or term not found")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher_weekly(
    State(state): State<AppState>,
    RequireSchedulesRead(_auth_user): RequireSchedulesRead,
    Path(teacher_id): Path<TeacherId>,
    Query(query): Query<WeeklyScheduleQuery>,
) -> Result<Json<WeeklyTimetableResponse>, AppError> {
    let weekly =
        ScheduleService::get_weekly(&state.db, ScheduleOwner::Teacher(teacher_id), query.term_id)
            .await?;
    Ok(Json(weekly))
}

/// Teachers see what they teach; students see their class timetable.
#[utoipa::path(
    get,
    path = "/api/schedules/me/weekly",
    summary = "My weekly timetable",
    params(WeeklyScheduleQuery),
    responses(
        (status = 200, description = "Slots grouped by day name", body = WeeklyTimetableResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role has no personal timetable"),
        (status = 404, description = "No teacher or student profile, or no class assigned")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_weekly(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WeeklyScheduleQuery>,
) -> Result<Json<WeeklyTimetableResponse>, AppError> {
    let user_id = auth_user.user_id()?;

    let owner = if is_teacher(&auth_user) {
        ScheduleOwner::Teacher(ScheduleService::teacher_for_user(&state.db, user_id).await?)
    } else if is_student(&auth_user) {
        ScheduleOwner::Class(ScheduleService::class_for_student_user(&state.db, user_id).await?)
    } else {
        return Err(AppError::forbidden(
            "Only teachers and students have a personal timetable",
        ));
    };

    let weekly = ScheduleService::get_weekly(&state.db, owner, query.term_id).await?;
    Ok(Json(weekly))
}
