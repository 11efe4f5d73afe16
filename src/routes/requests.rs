use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::request_dto::{
        CreateRequestPayload, RequestListQuery, RequestListResponse, RequestResponse,
        UpdateRequestPayload,
    },
    error::Result,
    middleware::auth::AuthenticatedUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/requests",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority")
    ),
    responses(
        (status = 200, description = "Requests of the caller, newest first", body = Json<RequestListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl IntoResponse> {
    let owner = state.user_service.ensure(&caller.user).await?;
    let items = state.request_service.list(owner.id, query).await?;
    Ok(Json(RequestListResponse::from(items)))
}

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Request created", body = Json<RequestResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(mut payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let owner = state.user_service.ensure(&caller.user).await?;
    let request = state.request_service.create(owner.id, payload).await?;
    Ok((StatusCode::CREATED, Json(RequestResponse::from(request))))
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request found", body = Json<RequestResponse>),
        (status = 404, description = "Request not found")
    )
)]
#[axum::debug_handler]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let owner = state.user_service.ensure(&caller.user).await?;
    let request = state.request_service.get(owner.id, id).await?;
    Ok(Json(RequestResponse::from(request)))
}

#[utoipa::path(
    patch,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    request_body = UpdateRequestPayload,
    responses(
        (status = 200, description = "Request updated", body = Json<RequestResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Request not found")
    )
)]
#[axum::debug_handler]
pub async fn update_request(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let owner = state.user_service.ensure(&caller.user).await?;
    let request = state.request_service.update(owner.id, id, payload).await?;
    Ok(Json(RequestResponse::from(request)))
}

#[utoipa::path(
    delete,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_request(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let owner = state.user_service.ensure(&caller.user).await?;
    state.request_service.delete(owner.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
