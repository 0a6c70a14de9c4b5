use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::admin::models::SessionStatus;
use crate::admin::ports::AdminServicePort;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Report the current session without enforcing it. Never fails.
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Json<MeResponseData> {
    let status = state
        .admin_service
        .session_status(cookies::session_token(&jar));

    Json(status.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub username: String,
}

impl From<SessionStatus> for MeResponseData {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Anonymous => Self {
                authenticated: false,
                user: None,
            },
            SessionStatus::Authenticated(admin) => Self {
                authenticated: true,
                user: Some(UserData {
                    username: admin.username,
                }),
            },
        }
    }
}
