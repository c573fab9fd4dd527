#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use inventory_client::client::{ApiClient, AuthBackend};
use inventory_client::models::{LoginForm, Session};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret123";

#[derive(Default)]
struct Store {
    products: Vec<Value>,
    users: HashMap<String, (String, String)>,
    tokens: HashSet<String>,
}

type Shared = Arc<Mutex<Store>>;

/// In-process stand-in for the inventory REST backend.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    store: Shared,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store: Shared = Arc::new(Mutex::new(seed()));
        let app = router(store.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self { port, base_url, store };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("fake backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(&self.api_url(), Duration::from_secs(5))?)
    }

    pub async fn login(&self) -> Result<Session> {
        Ok(self.client()?.login(&LoginForm::new(USERNAME, PASSWORD)).await?)
    }

    pub fn product_count(&self) -> usize {
        self.store.lock().unwrap().products.len()
    }

    /// Drop every issued token, as if they all expired.
    pub fn expire_tokens(&self) {
        self.store.lock().unwrap().tokens.clear();
    }
}

fn seed() -> Store {
    let mut users = HashMap::new();
    users.insert(USERNAME.to_string(), ("Alice".to_string(), PASSWORD.to_string()));

    Store {
        // Mixed id and price encodings, as seen from real deployments.
        products: vec![
            json!({ "_id": 1, "name": "Apple", "price": "10.00", "quantity": 0, "createdAt": "2024-01-15 10:30:00" }),
            json!({ "_id": 2, "name": "Banana", "price": 5, "quantity": 10, "createdAt": "2024-01-16T08:00:00Z" }),
        ],
        users,
        tokens: HashSet::new(),
    }
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/products/all", get(list_products))
        .route("/api/products", post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .with_state(store)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorize(store: &Store, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(t) if store.tokens.contains(t) => Ok(()),
        Some(_) => Err(error(StatusCode::UNAUTHORIZED, "Token expired")),
        None => Err(error(StatusCode::UNAUTHORIZED, "Authentication required")),
    }
}

fn id_matches(product: &Value, id: &str) -> bool {
    match &product["_id"] {
        Value::String(s) => s == id,
        Value::Number(n) => n.to_string() == id,
        _ => false,
    }
}

fn validate(body: &Value) -> Result<(), Response> {
    let mut errors = serde_json::Map::new();
    if body["name"].as_str().map_or(true, |n| n.trim().is_empty()) {
        errors.insert("name".into(), json!(["Name is required"]));
    }
    if body["price"].as_f64().map_or(true, |p| p < 0.0) {
        errors.insert("price".into(), json!(["Price must be a non-negative number"]));
    }
    if body["quantity"].as_u64().is_none() {
        errors.insert("quantity".into(), json!(["Quantity must be a whole number"]));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Validation failed", "errors": errors })),
        )
            .into_response())
    }
}

async fn list_products(State(store): State<Shared>) -> Response {
    let store = store.lock().unwrap();
    Json(Value::Array(store.products.clone())).into_response()
}

async fn get_product(State(store): State<Shared>, Path(id): Path<String>) -> Response {
    let store = store.lock().unwrap();
    match store.products.iter().find(|p| id_matches(p, &id)) {
        Some(p) => Json(p.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn create_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(r) = authorize(&store, &headers).and_then(|_| validate(&body)) {
        return r;
    }

    let product = json!({
        "_id": uuid::Uuid::new_v4().to_string(),
        "name": body["name"],
        "price": body["price"],
        "quantity": body["quantity"],
        "createdAt": "2024-02-01T12:00:00Z",
    });
    store.products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(r) = authorize(&store, &headers).and_then(|_| validate(&body)) {
        return r;
    }

    match store.products.iter_mut().find(|p| id_matches(p, &id)) {
        Some(product) => {
            for field in ["name", "price", "quantity"] {
                product[field] = body[field].clone();
            }
            Json(product.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn delete_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(r) = authorize(&store, &headers) {
        return r;
    }

    let before = store.products.len();
    store.products.retain(|p| !id_matches(p, &id));
    if store.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn login(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let name = match store.users.get(&username) {
        Some((name, expected)) if expected == password => name.clone(),
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };

    let token = uuid::Uuid::new_v4().to_string();
    store.tokens.insert(token.clone());
    Json(json!({
        "token": token,
        "user": { "_id": format!("u-{}", username), "name": name, "username": username },
    }))
    .into_response()
}

/// Answers with the flat profile shape, unlike login.
async fn register(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if store.users.contains_key(&username) {
        return error(StatusCode::CONFLICT, "Username already exists");
    }
    store.users.insert(username.clone(), (name.clone(), password));

    let token = uuid::Uuid::new_v4().to_string();
    store.tokens.insert(token.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "token": token, "_id": format!("u-{}", username), "name": name, "username": username })),
    )
        .into_response()
}
