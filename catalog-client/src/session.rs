use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::view::MountFlag;

/// Default login view redirected to by the guard.
pub const LOGIN_PATH: &str = "/admin/login";

/// Response of the session introspection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub username: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Answers "is the current session authenticated".
#[async_trait]
pub trait SessionProbe: Send + Sync + 'static {
    async fn me(&self) -> Result<SessionInfo, ClientError>;
}

/// Client for the admin session API. Keeps the session cookie in its own
/// cookie store.
#[derive(Debug, Clone)]
pub struct SessionClient {
    api: ApiClient,
}

impl SessionClient {
    /// Create a client for the session API under `api_url`. A path prefix
    /// in `api_url` is kept, so `https://host/backend` targets
    /// `https://host/backend/api/me`.
    ///
    /// # Errors
    /// `Config` if `api_url` is not a valid base URL
    pub fn new(api_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        let api = ApiClient::with_client(client, api_url, None)?;

        Ok(Self { api })
    }

    pub fn base(&self) -> &Url {
        self.api.base()
    }

    /// Log in; on success the session cookie is stored for later calls.
    ///
    /// # Errors
    /// `Api` carrying the server's `error` message, or `Login failed`
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let url = self.api.url("api/login", &[]);
        let response = self
            .api
            .request(Method::POST, url)
            .json(&LoginBody { username, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(username, "Logged in");
            return Ok(());
        }

        let body: Option<serde_json::Value> = response.json().await.ok();
        let message = body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(|error| error.as_str())
            .filter(|error| !error.is_empty())
            .unwrap_or("Login failed")
            .to_string();

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.api.url("api/logout", &[]);
        self.api.send_empty(self.api.request(Method::POST, url)).await
    }

    pub async fn me(&self) -> Result<SessionInfo, ClientError> {
        let url = self.api.url("api/me", &[]);
        let info: Option<SessionInfo> = self.api.send_json(self.api.request(Method::GET, url)).await?;

        Ok(info.unwrap_or_default())
    }
}

#[async_trait]
impl SessionProbe for SessionClient {
    async fn me(&self) -> Result<SessionInfo, ClientError> {
        SessionClient::me(self).await
    }
}

/// What a protected view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Check in flight: render neither the view nor a redirect
    Checking,
    Authenticated,
    /// Go to the login view, remembering where the user was headed
    Redirect { to: String, from: String },
}

/// Session check run each time a protected view mounts.
pub struct SessionGuard<P> {
    probe: Arc<P>,
    login_path: String,
}

impl<P: SessionProbe> SessionGuard<P> {
    pub fn new(probe: Arc<P>) -> Self {
        Self {
            probe,
            login_path: LOGIN_PATH.to_string(),
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Start one session check for a view mounted at `location`.
    ///
    /// Nothing is cached between mounts. A failed check redirects. Must be
    /// called within a tokio runtime.
    pub fn mount(&self, location: impl Into<String>) -> GuardMount {
        let (tx, rx) = watch::channel(GuardState::Checking);
        let mounted = MountFlag::new();

        let probe = Arc::clone(&self.probe);
        let flag = mounted.clone();
        let from = location.into();
        let to = self.login_path.clone();

        let fallback = GuardState::Redirect {
            to: to.clone(),
            from: from.clone(),
        };

        let task = tokio::spawn(async move {
            // The probe runs in its own task so a panic still ends in a verdict.
            let outcome = tokio::spawn(async move { probe.me().await }).await;

            if !flag.is_mounted() {
                tracing::debug!(location = %from, "Session check finished after unmount");
                return;
            }

            let next = match outcome {
                Ok(Ok(info)) if info.authenticated => GuardState::Authenticated,
                Ok(Ok(_)) => GuardState::Redirect { to, from },
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Session check failed");
                    GuardState::Redirect { to, from }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Session check aborted");
                    GuardState::Redirect { to, from }
                }
            };

            let _ = tx.send(next);
        });

        GuardMount {
            state: rx,
            mounted,
            task,
            fallback,
        }
    }
}

/// A mounted guard. Dropping it marks the view unmounted.
pub struct GuardMount {
    state: watch::Receiver<GuardState>,
    mounted: MountFlag,
    task: JoinHandle<()>,
    fallback: GuardState,
}

impl GuardMount {
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.clone()
    }

    /// Wait until the check has settled.
    pub async fn settled(&mut self) -> GuardState {
        if let Ok(state) = self
            .state
            .wait_for(|state| *state != GuardState::Checking)
            .await
        {
            return state.clone();
        }

        // Sender gone without a verdict: the check task died.
        match self.state.borrow().clone() {
            GuardState::Checking => self.fallback.clone(),
            settled => settled,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for GuardMount {
    fn drop(&mut self) {
        self.mounted.unmount();
    }
}
