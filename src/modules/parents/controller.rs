use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::{ParentId, StudentId};

use crate::middleware::auth::{
    AuthUser, RequireParentsCreate, RequireParentsDelete, RequireParentsRead,
    RequireParentsUpdate,
};
use crate::middleware::role::is_parent;
use crate::modules::parents::model::{
    CreateParentDto, LinkChildDto, PaginatedParentsResponse, ParentChild, ParentFilterParams,
    ParentWithChildren, UpdateParentDto,
};
use crate::modules::parents::service::ParentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/parents",
    summary = "Create parent",
    description = "Creates the parent's login account and profile together.",
    request_body = CreateParentDto,
    responses(
        (status = 201, description = "Parent created", body = ParentWithChildren),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_parent(
    State(state): State<AppState>,
    RequireParentsCreate(_auth_user): RequireParentsCreate,
    ValidatedJson(dto): ValidatedJson<CreateParentDto>,
) -> Result<(StatusCode, Json<ParentWithChildren>), AppError> {
    let parent = ParentService::create_parent(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(parent)))
}

#[utoipa::path(
    get,
    path = "/api/parents",
    summary = "List parents",
    params(ParentFilterParams),
    responses(
        (status = 200, description = "Parents", body = PaginatedParentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_parents(
    State(state): State<AppState>,
    RequireParentsRead(_auth_user): RequireParentsRead,
    Query(filters): Query<ParentFilterParams>,
) -> Result<Json<PaginatedParentsResponse>, AppError> {
    Ok(Json(ParentService::get_parents(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/parents/{id}",
    summary = "Get parent with children",
    params(("id" = String, Path, description = "Parent ID")),
    responses(
        (status = 200, description = "Parent", body = ParentWithChildren),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_parent(
    State(state): State<AppState>,
    RequireParentsRead(_auth_user): RequireParentsRead,
    Path(id): Path<ParentId>,
) -> Result<Json<ParentWithChildren>, AppError> {
    Ok(Json(ParentService::get_parent(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/parents/{id}",
    summary = "Update parent",
    params(("id" = String, Path, description = "Parent ID")),
    request_body = UpdateParentDto,
    responses(
        (status = 200, description = "Parent updated", body = ParentWithChildren),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_parent(
    State(state): State<AppState>,
    RequireParentsUpdate(_auth_user): RequireParentsUpdate,
    Path(id): Path<ParentId>,
    ValidatedJson(dto): ValidatedJson<UpdateParentDto>,
) -> Result<Json<ParentWithChildren>, AppError> {
    Ok(Json(ParentService::update_parent(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/parents/{id}",
    summary = "Delete parent",
    params(("id" = String, Path, description = "Parent ID")),
    responses(
        (status = 204, description = "Parent deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_parent(
    State(state): State<AppState>,
    RequireParentsDelete(_auth_user): RequireParentsDelete,
    Path(id): Path<ParentId>,
) -> Result<StatusCode, AppError> {
    ParentService::delete_parent(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/parents/{id}/children",
    summary = "Link a child",
    description = "Links a student to the parent. Linking an already linked student updates the relationship.",
    params(("id" = String, Path, description = "Parent ID")),
    request_body = LinkChildDto,
    responses(
        (status = 200, description = "Parent with updated children", body = ParentWithChildren),
        (status = 400, description = "Student not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn link_child(
    State(state): State<AppState>,
    RequireParentsUpdate(_auth_user): RequireParentsUpdate,
    Path(id): Path<ParentId>,
    ValidatedJson(dto): ValidatedJson<LinkChildDto>,
) -> Result<Json<ParentWithChildren>, AppError> {
    Ok(Json(ParentService::link_child(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/parents/{id}/children/{student_id}",
    summary = "Unlink a child",
    params(
        ("id" = String, Path, description = "Parent ID"),
        ("student_id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Child unlinked"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student is not linked to this parent")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn unlink_child(
    State(state): State<AppState>,
    RequireParentsUpdate(_auth_user): RequireParentsUpdate,
    Path((id, student_id)): Path<(ParentId, StudentId)>,
) -> Result<StatusCode, AppError> {
    ParentService::unlink_child(&state.db, id, student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/parents/me/children",
    summary = "My children",
    description = "Students linked to the calling parent.",
    responses(
        (status = 200, description = "Linked students", body = Vec<ParentChild>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a parent")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ParentChild>>, AppError> {
    if !is_parent(&auth_user) {
        return Err(AppError::forbidden("Only parents have linked children"));
    }
    let user_id = auth_user.user_id()?;
    Ok(Json(
        ParentService::children_for_user(&state.db, user_id).await?,
    ))
}
