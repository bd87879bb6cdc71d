use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::AppError;
use classbook_models::TermId;

use crate::middleware::auth::{
    RequireTermsCreate, RequireTermsDelete, RequireTermsRead, RequireTermsUpdate,
};
use crate::modules::terms::model::{
    CreateTermDto, PaginatedTermsResponse, Term, TermFilterParams, UpdateTermDto,
};
use crate::modules::terms::service::TermService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/terms",
    summary = "Create term",
    request_body = CreateTermDto,
    responses(
        (status = 201, description = "Term created", body = Term),
        (status = 400, description = "Invalid or overlapping dates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_term(
    State(state): State<AppState>,
    RequireTermsCreate(_auth_user): RequireTermsCreate,
    ValidatedJson(dto): ValidatedJson<CreateTermDto>,
) -> Result<(StatusCode, Json<Term>), AppError> {
    let term = TermService::create_term(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(term)))
}

#[utoipa::path(
    get,
    path = "/api/terms",
    summary = "List terms",
    params(TermFilterParams),
    responses(
        (status = 200, description = "Terms", body = PaginatedTermsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_terms(
    State(state): State<AppState>,
    RequireTermsRead(_auth_user): RequireTermsRead,
    Query(filters): Query<TermFilterParams>,
) -> Result<Json<PaginatedTermsResponse>, AppError> {
    Ok(Json(TermService::get_terms(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/terms/active",
    summary = "Get the active term",
    responses(
        (status = 200, description = "Active term", body = Term),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No active term")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_active_term(
    State(state): State<AppState>,
    RequireTermsRead(_auth_user): RequireTermsRead,
) -> Result<Json<Term>, AppError> {
    Ok(Json(TermService::get_active_term(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/terms/{id}",
    summary = "Get term",
    params(("id" = String, Path, description = "Term ID")),
    responses(
        (status = 200, description = "Term", body = Term),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Term not found")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_term(
    State(state): State<AppState>,
    RequireTermsRead(_auth_user): RequireTermsRead,
    Path(id): Path<TermId>,
) -> Result<Json<Term>, AppError> {
    Ok(Json(TermService::get_term(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/terms/{id}",
    summary = "Update term",
    params(("id" = String, Path, description = "Term ID")),
    request_body = UpdateTermDto,
    responses(
        (status = 200, description = "Term updated", body = Term),
        (status = 400, description = "Invalid or overlapping dates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Term not found")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_term(
    State(state): State<AppState>,
    RequireTermsUpdate(_auth_user): RequireTermsUpdate,
    Path(id): Path<TermId>,
    ValidatedJson(dto): ValidatedJson<UpdateTermDto>,
) -> Result<Json<Term>, AppError> {
    Ok(Json(TermService::update_term(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/terms/{id}",
    summary = "Delete term",
    params(("id" = String, Path, description = "Term ID")),
    responses(
        (status = 204, description = "Term deleted"),
        (status = 400, description = "Term has schedule slots"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Term not found")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_term(
    State(state): State<AppState>,
    RequireTermsDelete(_auth_user): RequireTermsDelete,
    Path(id): Path<TermId>,
) -> Result<StatusCode, AppError> {
    TermService::delete_term(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/terms/{id}/activate",
    summary = "Activate term",
    description = "Marks this term active and every other term inactive.",
    params(("id" = String, Path, description = "Term ID")),
    responses(
        (status = 200, description = "Term activated", body = Term),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Term not found")
    ),
    tag = "Terms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn activate_term(
    State(state): State<AppState>,
    RequireTermsUpdate(_auth_user): RequireTermsUpdate,
    Path(id): Path<TermId>,
) -> Result<Json<Term>, AppError> {
    Ok(Json(TermService::activate_term(&state.db, id).await?))
}
