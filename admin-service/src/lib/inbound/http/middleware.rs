use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies;
use super::handlers::ApiError;
use crate::admin::ports::AdminServicePort;
use crate::inbound::http::router::AppState;

/// Middleware that requires a valid session cookie and adds the
/// authenticated admin to request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let admin = state
        .admin_service
        .authenticate_session(cookies::session_token(&jar))
        .map_err(|e| {
            tracing::warn!(uri = %req.uri(), error = %e, "Session check failed");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(admin);

    Ok(next.run(req).await)
}
