use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, ErrorBody, INTERNAL_ERROR_MESSAGE, InternalErrorDetail};
use crate::extractors::auth::bearer_claims;
use crate::models::auth::ROLE_ADMIN;
use crate::state::AppState;

/// Client key for rate limiting: peer address, else the first
/// `X-Forwarded-For` hop.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Fixed-window limit on the unauthenticated result check.
pub async fn limit_public_check(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req);
    if let Err(retry_after) = state.check_limiter.check(&key) {
        tracing::warn!(client = %key, retry_after, "Public result check rate limited");
        return Err(AppError::RateLimited { retry_after });
    }
    Ok(next.run(req).await)
}

/// Internal error details reach administrators only. Everyone else gets the
/// generic message.
pub async fn expose_internal_detail(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let is_admin = bearer_claims(req.headers(), &state.config.auth.jwt_secret)
        .is_ok_and(|claims| claims.role == ROLE_ADMIN);

    let mut response = next.run(req).await;
    let Some(InternalErrorDetail(detail)) = response.extensions_mut().remove::<InternalErrorDetail>()
    else {
        return response;
    };
    if !is_admin {
        return response;
    }

    let body = ErrorBody {
        code: "INTERNAL_ERROR",
        message: format!("{}: {}", INTERNAL_ERROR_MESSAGE, detail),
    };
    (response.status(), Json(body)).into_response()
}
