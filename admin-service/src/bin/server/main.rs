use std::net::SocketAddr;
use std::sync::Arc;

use admin_service::config::Config;
use admin_service::domain::admin::service::AdminService;
use admin_service::inbound::http::router::create_router;
use admin_service::outbound::credentials::FileCredentialStore;
use auth::Authenticator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "admin-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        port = config.server.port,
        frontend_origin = %config.server.frontend_origin,
        trust_proxy = config.server.trust_proxy,
        session_ttl_hours = config.session.ttl_hours,
        cookie_secure = config.session.cookie_secure,
        credentials_path = %config.credentials.path,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.session.secret.as_bytes()));
    let credential_store = FileCredentialStore::new(&config.credentials.path);

    let admin_service = Arc::new(
        AdminService::load(&credential_store, authenticator, config.session.ttl()).await?,
    );
    tracing::info!(
        username = %admin_service.username(),
        path = %credential_store.path().display(),
        "Admin credentials loaded"
    );

    let application = create_router(admin_service, &config)?;

    let address = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        port = config.server.port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(
        listener,
        application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited");

    Ok(())
}
