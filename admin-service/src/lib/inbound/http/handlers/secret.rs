use axum::Extension;
use axum::Json;
use serde_json::json;
use serde_json::Value;

use crate::admin::models::AuthenticatedAdmin;

/// Example route behind the session gate.
pub async fn secret(Extension(admin): Extension<AuthenticatedAdmin>) -> Json<Value> {
    tracing::debug!(username = %admin.username, "Serving protected resource");

    Json(json!({ "message": "Top secret admin data" }))
}
