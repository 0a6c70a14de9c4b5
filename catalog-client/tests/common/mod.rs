use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use axum::extract::Multipart;
use axum::extract::OriginalUri;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use catalog_client::ClientConfig;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;

pub const ID_TOKEN: &str = "test-id-token";

/// What the mock upstream has seen and stored
#[derive(Default)]
pub struct Recorded {
    pub products: BTreeMap<String, Value>,
    pub contacts: BTreeMap<String, Value>,
    pub gallery: Vec<Value>,
    pub authorization: Vec<Option<String>>,
    pub resolve_calls: Vec<Vec<String>>,
    pub storage_parts: Vec<String>,
    pub gallery_parts: Vec<(String, usize)>,
    pub content_types: Vec<Option<String>>,
    pub session_paths: Vec<String>,
}

#[derive(Clone)]
pub struct UpstreamState {
    pub address: String,
    pub requests: Arc<AtomicUsize>,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl UpstreamState {
    fn seen(&self, headers: &HeaderMap) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut recorded = self.recorded.lock().unwrap();
        recorded.authorization.push(authorization);
        recorded.content_types.push(content_type);
    }

    fn session_call(&self, headers: &HeaderMap, uri: &OriginalUri) {
        self.seen(headers);
        self.recorded.lock().unwrap().session_paths.push(uri.path().to_string());
    }
}

/// Mock catalog store and session API spawned on a random port
pub struct TestUpstream {
    pub address: String,
    pub state: UpstreamState,
}

impl TestUpstream {
    /// Spawn the mock in a background task
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = UpstreamState {
            address: address.clone(),
            requests: Arc::new(AtomicUsize::new(0)),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        };

        // Served both at the root and under a path prefix
        let session_routes: Router<UpstreamState> = Router::new()
            .route("/api/login", post(login))
            .route("/api/logout", post(logout))
            .route("/api/me", get(me));

        let router = Router::new()
            .route("/products_info", get(list_products).post(create_product))
            .route("/products_info/logs", get(list_logs))
            .route("/legacy/products_info", get(list_products_legacy))
            .route(
                "/products_info/:id",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/contact", get(list_contacts).post(create_contact))
            .route("/contact/:id", axum::routing::delete(delete_contact))
            .route(
                "/gallery",
                get(list_gallery).post(upload_gallery).delete(delete_gallery),
            )
            .route("/upload/view", post(resolve_keys))
            .route("/upload/presign", post(presign))
            .route("/storage", post(storage_upload))
            .merge(session_routes.clone())
            .nest("/backend", session_routes)
            .with_state(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self { address, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.address.clone(),
            api_base: self.address.clone(),
            contact_api: self.address.clone(),
            main_api_base: String::new(),
            id_token: Some(ID_TOKEN.to_string()),
        }
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().unwrap()
    }

    pub fn seed_product(&self, product: Value) {
        let id = product["productId"].as_str().unwrap().to_string();
        self.recorded().products.insert(id, product);
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

async fn list_products(State(state): State<UpstreamState>, headers: HeaderMap) -> Json<Value> {
    state.seen(&headers);
    let products: Vec<Value> = state.recorded.lock().unwrap().products.values().cloned().collect();
    Json(Value::Array(products))
}

/// Older deployment keying the list under `products`
async fn list_products_legacy(State(state): State<UpstreamState>, headers: HeaderMap) -> Json<Value> {
    state.seen(&headers);
    Json(json!({ "products": [{ "productId": "p-legacy", "title": "Old chair" }] }))
}

async fn create_product(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.seen(&headers);
    let Some(id) = body["productId"].as_str().map(str::to_string) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "productId is required" })))
            .into_response();
    };

    // Answers with a record the client cannot parse
    if id.starts_with("garbled-") {
        return (
            StatusCode::CREATED,
            Json(json!({ "item": { "productId": 42, "title": "stored" } })),
        )
            .into_response();
    }

    let mut item = body.clone();
    item["createdAt"] = json!("2024-06-01T00:00:00Z");
    state.recorded.lock().unwrap().products.insert(id, item.clone());

    (StatusCode::CREATED, Json(json!({ "item": item, "message": "Created" }))).into_response()
}

async fn get_product(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.seen(&headers);
    match state.recorded.lock().unwrap().products.get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => not_found("Product not found"),
    }
}

/// Applies the patch but answers without the record
async fn update_product(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    state.seen(&headers);
    let mut recorded = state.recorded.lock().unwrap();
    let Some(product) = recorded.products.get_mut(&id) else {
        return not_found("Product not found");
    };

    if let (Some(target), Some(fields)) = (product.as_object_mut(), patch.as_object()) {
        for (name, value) in fields {
            target.insert(name.clone(), value.clone());
        }
    }

    Json(json!({ "message": "Updated" })).into_response()
}

async fn delete_product(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.seen(&headers);
    match state.recorded.lock().unwrap().products.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (StatusCode::NOT_FOUND, "no such product").into_response(),
    }
}

async fn list_logs(State(state): State<UpstreamState>, headers: HeaderMap) -> Json<Value> {
    state.seen(&headers);
    Json(json!({
        "items": [
            {
                "logId": "l-1",
                "ts": "2024-06-01T10:00:00Z",
                "productId": "p-1",
                "action": "CREATE",
                "user": "admin",
                "details": "Created product"
            }
        ]
    }))
}

async fn list_contacts(State(state): State<UpstreamState>, headers: HeaderMap) -> Json<Value> {
    state.seen(&headers);
    let contacts: Vec<Value> = state.recorded.lock().unwrap().contacts.values().cloned().collect();
    if contacts.is_empty() {
        return Json(json!({ "items": null }));
    }
    Json(json!({ "items": contacts, "count": contacts.len() }))
}

/// Echoes the stored record flat
async fn create_contact(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.seen(&headers);
    let id = body["contactID"].as_str().unwrap_or_default().to_string();
    state.recorded.lock().unwrap().contacts.insert(id, body.clone());
    Json(body)
}

async fn delete_contact(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.seen(&headers);
    match state.recorded.lock().unwrap().contacts.remove(&id) {
        Some(_) => Json(json!({ "message": "Deleted" })).into_response(),
        None => (StatusCode::FORBIDDEN, Json(json!({ "message": "Not allowed" }))).into_response(),
    }
}

async fn list_gallery(State(state): State<UpstreamState>, headers: HeaderMap) -> Json<Value> {
    state.seen(&headers);
    Json(Value::Array(state.recorded.lock().unwrap().gallery.clone()))
}

async fn upload_gallery(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.seen(&headers);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();

        let mut recorded = state.recorded.lock().unwrap();
        recorded.gallery_parts.push((name, bytes.len()));
        let item = json!({
            "id": filename,
            "url": format!("{}/cdn/{}", state.address, filename),
            "size": bytes.len()
        });
        recorded.gallery.push(item);
    }

    (StatusCode::CREATED, Json(json!({ "ok": true }))).into_response()
}

#[derive(Deserialize)]
struct IdQuery {
    id: String,
}

async fn delete_gallery(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Response {
    state.seen(&headers);
    let mut recorded = state.recorded.lock().unwrap();
    let before = recorded.gallery.len();
    recorded.gallery.retain(|item| item["id"] != query.id.as_str());

    if recorded.gallery.len() == before {
        return not_found("Image not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Keys under `missing/` never resolve
async fn resolve_keys(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.seen(&headers);
    let keys: Vec<String> = body["keys"]
        .as_array()
        .map(|keys| {
            keys.iter()
                .filter_map(|key| key.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    state.recorded.lock().unwrap().resolve_calls.push(keys.clone());

    let urls: Vec<Value> = keys
        .iter()
        .map(|key| {
            if key.starts_with("missing/") {
                json!({ "key": key })
            } else {
                json!({ "key": key, "url": format!("https://signed.example.com/{}?sig=1", key) })
            }
        })
        .collect();

    Json(json!({ "urls": urls }))
}

async fn presign(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.seen(&headers);
    let key = format!(
        "products/{}/{}",
        body["productId"].as_str().unwrap_or_default(),
        body["filename"].as_str().unwrap_or_default()
    );

    Json(json!({
        "upload": {
            "url": format!("{}/storage", state.address),
            "fields": {
                "key": key,
                "policy": "eyJleHAiOiIyMDk5In0=",
                "Content-Type": body["contentType"]
            }
        },
        "key": key
    }))
}

/// Rejects objects whose key contains `denied`
async fn storage_upload(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    state.seen(&headers);
    let mut denied = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.bytes().await.unwrap_or_default();
        if name == "key" && String::from_utf8_lossy(&value).contains("denied") {
            denied = true;
        }
        state.recorded.lock().unwrap().storage_parts.push(name);
    }

    if denied {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn login(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    uri: OriginalUri,
    Json(body): Json<Value>,
) -> Response {
    state.session_call(&headers, &uri);
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("admin"), Some("secret")) => (
            [(header::SET_COOKIE, "ys_session=valid-session; Path=/; HttpOnly")],
            Json(json!({ "success": true })),
        )
            .into_response(),
        (Some(""), _) | (_, Some("")) => {
            (StatusCode::BAD_REQUEST, "not json at all").into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid username or password" })),
        )
            .into_response(),
    }
}

async fn logout(State(state): State<UpstreamState>, headers: HeaderMap, uri: OriginalUri) -> Response {
    state.session_call(&headers, &uri);
    (
        [(header::SET_COOKIE, "ys_session=; Path=/; Max-Age=0")],
        Json(json!({ "success": true })),
    )
        .into_response()
}

async fn me(State(state): State<UpstreamState>, headers: HeaderMap, uri: OriginalUri) -> Json<Value> {
    state.session_call(&headers, &uri);
    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains("ys_session=valid-session"));

    if authenticated {
        Json(json!({ "authenticated": true, "user": { "username": "admin" } }))
    } else {
        Json(json!({ "authenticated": false }))
    }
}
