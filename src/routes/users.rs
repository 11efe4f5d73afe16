use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::{error::Result, middleware::auth::AuthenticatedUser, AppState};

#[utoipa::path(
    post,
    path = "/api/users/sync",
    responses(
        (status = 200, description = "Telegram user stored", body = Json<TelegramUser>),
        (status = 401, description = "Invalid init data")
    )
)]
#[axum::debug_handler]
pub async fn sync_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.upsert(&caller.user).await?;
    tracing::info!(telegram_id = user.telegram_id, "telegram user synced");
    Ok(Json(user))
}
