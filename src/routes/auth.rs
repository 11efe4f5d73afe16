use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    dto::auth_dto::{ValidateUserRequest, ValidateUserResponse},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/validate-user",
    request_body = ValidateUserRequest,
    responses(
        (status = 200, description = "Init data is signed by Telegram", body = Json<ValidateUserResponse>),
        (status = 400, description = "No init data provided"),
        (status = 401, description = "Invalid init data")
    )
)]
#[axum::debug_handler]
pub async fn validate_user(
    State(state): State<AppState>,
    Json(payload): Json<ValidateUserRequest>,
) -> Result<impl IntoResponse> {
    let init_data = payload
        .init_data
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Error::BadRequest("No init data provided".to_string()))?;

    if !state.verifier.verify(&init_data) {
        tracing::warn!("rejected init data with invalid signature");
        return Err(Error::Unauthorized("Invalid init data".to_string()));
    }

    Ok(Json(ValidateUserResponse { success: true }))
}
