use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::SuccessBody;
use crate::admin::models::LoginCommand;
use crate::admin::ports::AdminServicePort;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Verify the submitted credentials and set the session cookie.
///
/// A body that is not JSON, or lacks either field, is treated as missing
/// credentials rather than as a decoding failure.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<(CookieJar, Json<SuccessBody>), ApiError> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Login body rejected");
            LoginRequestBody::default()
        }
    };

    let command = LoginCommand::new(body.username, body.password)?;
    let grant = state.admin_service.login(command).await?;

    let cookie = cookies::session_cookie(grant.token, grant.max_age, state.cookie_secure);

    Ok((jar.add(cookie), Json(SuccessBody::ok())))
}

#[derive(Clone, Default, Deserialize)]
pub struct LoginRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}
