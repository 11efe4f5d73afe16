use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/uploads",
    responses(
        (status = 201, description = "File stored", body = Json<Attachment>),
        (status = 400, description = "No file provided"),
        (status = 413, description = "File too large")
    )
)]
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("file.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        let attachment = state
            .storage_service
            .save(&file_name, &content_type, &data)
            .await?;
        tracing::info!(
            telegram_id = caller.user.id,
            attachment_id = %attachment.id,
            "attachment uploaded"
        );
        return Ok((StatusCode::CREATED, Json(attachment)));
    }

    Err(Error::BadRequest("No file provided".into()))
}
