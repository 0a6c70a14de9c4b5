use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header;
use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health;
use super::handlers::login;
use super::handlers::logout;
use super::handlers::me;
use super::handlers::root;
use super::handlers::secret;
use super::middleware::require_session;
use super::rate_limit;
use super::rate_limit::RateLimitState;
use crate::config::Config;
use crate::domain::admin::service::AdminService;

#[derive(Clone)]
pub struct AppState {
    pub admin_service: Arc<AdminService>,
    pub cookie_secure: bool,
}

/// Build the HTTP router.
///
/// # Errors
/// Returns an error if the configured frontend origin is not a valid header value
pub fn create_router(
    admin_service: Arc<AdminService>,
    config: &Config,
) -> Result<Router, InvalidHeaderValue> {
    let state = AppState {
        admin_service,
        cookie_secure: config.session.cookie_secure,
    };

    let trust_proxy = config.server.trust_proxy;
    let api_limit = RateLimitState::new(config.rate_limit.api, trust_proxy);
    let login_limit = RateLimitState::new(config.rate_limit.login, trust_proxy);

    let login_routes = Router::new()
        .route("/api/login", post(login))
        .route_layer(middleware::from_fn_with_state(
            login_limit,
            rate_limit::enforce,
        ));

    let protected_routes = Router::new()
        .route("/api/admin/secret", get(secret))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let api_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .merge(login_routes)
        .merge(protected_routes)
        .route_layer(middleware::from_fn_with_state(
            api_limit,
            rate_limit::enforce,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.server.frontend_origin)?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/", get(root))
        .merge(api_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state))
}
