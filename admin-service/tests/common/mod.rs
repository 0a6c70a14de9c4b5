use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use admin_service::config::Config;
use admin_service::config::CredentialsConfig;
use admin_service::config::RateLimitConfig;
use admin_service::config::ServerConfig;
use admin_service::config::SessionConfig;
use admin_service::config::WindowConfig;
use admin_service::domain::admin::service::AdminService;
use admin_service::inbound::http::router::create_router;
use admin_service::outbound::credentials::FileCredentialStore;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;

pub const SECRET: &str = "test-secret-key-for-session-signing-at-least-32-bytes";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub codec: TokenCodec,
    _credentials: CredentialsFile,
}

/// Credentials record written to a unique temp path, removed on drop
struct CredentialsFile(PathBuf);

impl CredentialsFile {
    fn new(username: &str, password: &str) -> Self {
        // Cheap parameters keep the suite fast; verification reads them from the hash.
        let hash = PasswordHasher::with_params(1024, 1, 1)
            .expect("Failed to build hasher")
            .hash(password)
            .expect("Failed to hash password");

        let path = std::env::temp_dir().join(format!(
            "admin-credentials-{}.json",
            uuid::Uuid::new_v4()
        ));
        let record = serde_json::json!({ "username": username, "passwordHash": hash });
        std::fs::write(&path, record.to_string()).expect("Failed to write credentials file");

        Self(path)
    }
}

impl Drop for CredentialsFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

impl TestApp {
    /// Spawn the application with default budgets
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn the application after adjusting its configuration
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        let credentials = CredentialsFile::new(ADMIN_USERNAME, ADMIN_PASSWORD);

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let mut config = Config {
            server: ServerConfig {
                port,
                frontend_origin: "http://localhost:3000".to_string(),
                trust_proxy: false,
            },
            session: SessionConfig {
                secret: SECRET.to_string(),
                ttl_hours: 24,
                cookie_secure: false,
            },
            credentials: CredentialsConfig {
                path: credentials.0.display().to_string(),
            },
            rate_limit: RateLimitConfig {
                api: WindowConfig {
                    max_requests: 300,
                    window_seconds: 900,
                },
                login: WindowConfig {
                    max_requests: 20,
                    window_seconds: 600,
                },
            },
        };
        configure(&mut config);
        config.validate().expect("Invalid test configuration");

        let authenticator = Arc::new(Authenticator::new(SECRET.as_bytes()));
        let store = FileCredentialStore::new(&config.credentials.path);
        let admin_service = Arc::new(
            AdminService::load(&store, authenticator, config.session.ttl())
                .await
                .expect("Failed to load admin service"),
        );

        let router = create_router(admin_service, &config).expect("Failed to build router");

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            port,
            // Cookies are passed explicitly so each test controls what is sent.
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
            codec: TokenCodec::new(SECRET.as_bytes()),
            _credentials: credentials,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request carrying a session cookie
    pub fn get_with_session(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path)
            .header(reqwest::header::COOKIE, format!("ys_session={}", token))
    }

    /// Log in with the configured admin credentials and return the response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/login")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Raw `Set-Cookie` header for the session cookie, if the response set one
pub fn session_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("ys_session="))
        .map(str::to_string)
}

/// Session token carried by the response's `Set-Cookie` header
pub fn session_token(response: &reqwest::Response) -> Option<String> {
    session_set_cookie(response).and_then(|cookie| {
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("ys_session="))
            .map(str::to_string)
    })
}
