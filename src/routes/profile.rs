use axum::{extract::State, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::{
    dto::profile_dto::{ProfileResponse, UpdateProfilePayload},
    error::Result,
    middleware::auth::AuthenticatedUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the caller", body = Json<ProfileResponse>),
        (status = 401, description = "Invalid init data")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.ensure(&caller.user).await?;
    let settings = state.profile_service.get(user.id).await?;
    Ok(Json(ProfileResponse::from_parts(&user, settings)))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile saved", body = Json<ProfileResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid init data")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(mut payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let user = state.user_service.ensure(&caller.user).await?;
    let settings = state.profile_service.upsert(user.id, payload).await?;
    Ok(Json(ProfileResponse::from_parts(&user, Some(settings))))
}
