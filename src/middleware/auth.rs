use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::utils::telegram_auth::{TelegramAuthError, WebAppUser};
use crate::AppState;

/// Authorization scheme Telegram documents for passing raw init-data.
pub const INIT_DATA_SCHEME: &str = "tma ";

/// Verified caller, inserted into request extensions by [`require_telegram_auth`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: WebAppUser,
    pub query_id: Option<String>,
    pub start_param: Option<String>,
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

pub async fn require_telegram_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(init_data) = auth_str.strip_prefix(INIT_DATA_SCHEME) else {
        return unauthorized("unsupported_scheme");
    };

    let verified = state
        .verifier
        .authenticate_at(init_data.trim(), chrono::Utc::now())
        .and_then(|data| {
            let user = data.user()?;
            Ok(AuthenticatedUser {
                user,
                query_id: data.query_id().map(str::to_string),
                start_param: data.start_param().map(str::to_string),
            })
        });

    match verified {
        Ok(caller) => {
            tracing::debug!(telegram_id = caller.user.id, "init data accepted");
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(err @ (TelegramAuthError::EmptySecret | TelegramAuthError::InvalidKey(_))) => {
            tracing::error!(error = %err, "verifier misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.code() })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(reason = err.code(), "init data rejected");
            unauthorized(err.code())
        }
    }
}
