use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::ClassId;

use crate::middleware::auth::{
    RequireClassesCreate, RequireClassesDelete, RequireClassesRead, RequireClassesUpdate,
    RequireStudentsRead,
};
use crate::modules::classes::model::{
    ClassFilterParams, ClassWithStats, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::modules::students::model::Student;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classes",
    summary = "Create class",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassWithStats),
        (status = 400, description = "Homeroom teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Class name taken for the academic year"),
        (status = 422, description = "Validation error")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireClassesCreate(_auth_user): RequireClassesCreate,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassWithStats>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    summary = "List classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Classes", body = PaginatedClassesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    RequireClassesRead(_auth_user): RequireClassesRead,
    Query(filters): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    Ok(Json(ClassService::get_classes(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    summary = "Get class",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class", body = ClassWithStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    RequireClassesRead(_auth_user): RequireClassesRead,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassWithStats>, AppError> {
    Ok(Json(ClassService::get_class(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    summary = "Update class",
    params(("id" = String, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = ClassWithStats),
        (status = 400, description = "Homeroom teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class name taken for the academic year")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    RequireClassesUpdate(_auth_user): RequireClassesUpdate,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<ClassWithStats>, AppError> {
    Ok(Json(ClassService::update_class(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    summary = "Delete class",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 400, description = "Class still has students or schedule slots"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    RequireClassesDelete(_auth_user): RequireClassesDelete,
    Path(id): Path<ClassId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_class(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/students",
    summary = "List a class's students",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Students in the class", body = Vec<Student>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class_students(
    State(state): State<AppState>,
    RequireStudentsRead(_auth_user): RequireStudentsRead,
    Path(id): Path<ClassId>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(ClassService::get_class_students(&state.db, id).await?))
}
