use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use super::SuccessBody;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Clear the session cookie. Always succeeds.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SuccessBody>) {
    tracing::info!(had_session = cookies::session_token(&jar).is_some(), "Admin logged out");

    (
        jar.add(cookies::cleared_session_cookie(state.cookie_secure)),
        Json(SuccessBody::ok()),
    )
}
