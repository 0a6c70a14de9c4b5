use std::env;
use std::time::Duration;

use axum::http::HeaderValue;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Application configuration for admin-service.
///
/// Loaded once at startup and handed to the router; request handlers never
/// read configuration sources themselves.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub credentials: CredentialsConfig,
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origin allowed by CORS, with credentials
    pub frontend_origin: String,
    /// Key rate limits on the first `X-Forwarded-For` hop instead of the peer address
    pub trust_proxy: bool,
}

/// Session token and cookie configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    /// Lifetime of both the token `exp` claim and the cookie `Max-Age`
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

/// Location of the admin credentials record.
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub path: String,
}

/// Request budgets per client.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Applies to every `/api` route
    pub api: WindowConfig,
    /// Applies to `/api/login` on top of `api`
    pub login: WindowConfig,
}

/// Rolling window budget.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl WindowConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Flat variables from the original deployment (PORT, FRONTEND_ORIGIN,
    ///    JWT_SECRET, COOKIE_SECURE, ADMIN_CREDENTIALS_PATH)
    /// 2. Environment variables (SERVER__PORT, SESSION__SECRET, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    ///
    /// # Errors
    /// Returns error if required values are missing or invalid
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = Self::with_defaults(ConfigBuilder::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: SESSION__SECRET=... overrides session.secret
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("server.frontend_origin", env::var("FRONTEND_ORIGIN").ok())?
            .set_override_option("session.secret", env::var("JWT_SECRET").ok())?
            .set_override_option(
                "session.cookie_secure",
                env::var("COOKIE_SECURE")
                    .ok()
                    .map(|value| value.eq_ignore_ascii_case("true")),
            )?
            .set_override_option("credentials.path", env::var("ADMIN_CREDENTIALS_PATH").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Register built-in defaults. The signing secret has none.
    pub fn with_defaults(
        builder: config::ConfigBuilder<DefaultState>,
    ) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("server.port", 4000)?
            .set_default("server.frontend_origin", "http://localhost:3000")?
            .set_default("server.trust_proxy", false)?
            .set_default("session.ttl_hours", 24)?
            .set_default("session.cookie_secure", false)?
            .set_default("credentials.path", "user.json")?
            .set_default("rate_limit.api.max_requests", 300)?
            .set_default("rate_limit.api.window_seconds", 15 * 60)?
            .set_default("rate_limit.login.max_requests", 20)?
            .set_default("rate_limit.login.window_seconds", 10 * 60)
    }

    /// Reject configurations the server must not run with.
    ///
    /// # Errors
    /// Returns `ConfigError::Message` describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "session.secret (JWT_SECRET) must be set".to_string(),
            ));
        }

        if self.session.ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "session.ttl_hours must be positive".to_string(),
            ));
        }

        if HeaderValue::from_str(&self.server.frontend_origin).is_err() {
            return Err(ConfigError::Message(format!(
                "server.frontend_origin is not a valid origin: {}",
                self.server.frontend_origin
            )));
        }

        for (name, window) in [("api", self.rate_limit.api), ("login", self.rate_limit.login)] {
            if window.max_requests == 0 || window.window_seconds == 0 {
                return Err(ConfigError::Message(format!(
                    "rate_limit.{} needs a positive budget and window",
                    name
                )));
            }
        }

        Ok(())
    }
}
