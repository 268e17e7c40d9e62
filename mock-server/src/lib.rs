//! In-memory stand-in for the CRM REST API.
//!
//! Serves the slice of the API the client exercises end to end: login and
//! logout with bearer tokens, the profile, clients CRUD, multipart upload
//! with download of the stored file, dashboard stats, and two endpoints
//! that return plain text and malformed JSON.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
}

#[derive(Deserialize)]
pub struct ClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

struct StoredDocument {
    original_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Db {
    sessions: RwLock<HashSet<String>>,
    clients: RwLock<HashMap<i64, Client>>,
    documents: RwLock<HashMap<i64, StoredDocument>>,
    next_id: AtomicI64,
}

impl Db {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub type AppState = Arc<Db>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "error": message })))
}

pub fn admin() -> User {
    User {
        id: 1,
        username: USERNAME.to_string(),
        email: "admin@example.com".to_string(),
        first_name: "Ivan".to_string(),
        last_name: "Petrov".to_string(),
        role: "admin".to_string(),
    }
}

pub fn app() -> Router {
    let db: AppState = Arc::new(Db::default());
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users/profile", get(profile))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/{id}", get(get_client).put(update_client).delete(delete_client))
        .route("/upload", post(upload))
        .route("/documents/{id}/download", get(download_document))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/health", get(health))
        .route("/broken", get(broken));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        None => Err(failure(StatusCode::UNAUTHORIZED, "Access token missing")),
        Some(t) if db.sessions.read().await.contains(t) => Ok(()),
        Some(_) => {
            warn!("rejected unknown token");
            Err(failure(StatusCode::UNAUTHORIZED, "Invalid token"))
        }
    }
}

async fn login(State(db): State<AppState>, Json(input): Json<Credentials>) -> Result<Json<Value>, Failure> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Username and password are required"));
    }
    if input.username != USERNAME {
        return Err(failure(StatusCode::UNAUTHORIZED, "User not found"));
    }
    if input.password != PASSWORD {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid password"));
    }
    let token = Uuid::new_v4().to_string();
    db.sessions.write().await.insert(token.clone());
    info!(username = %input.username, "login");
    Ok(Json(json!({ "token": token, "user": admin() })))
}

async fn logout(State(db): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&db, &headers).await?;
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        db.sessions.write().await.remove(token);
    }
    Ok(Json(json!({ "message": "Logged out" })))
}

async fn profile(State(db): State<AppState>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    authorize(&db, &headers).await?;
    Ok(Json(admin()))
}

#[derive(Deserialize)]
struct ClientFilter {
    search: Option<String>,
}

async fn list_clients(
    State(db): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<Vec<Client>>, Failure> {
    authorize(&db, &headers).await?;
    let clients = db.clients.read().await;
    let mut out: Vec<Client> = clients
        .values()
        .filter(|c| filter.search.as_deref().map_or(true, |s| c.name.contains(s)))
        .cloned()
        .collect();
    out.sort_by_key(|c| c.id);
    Ok(Json(out))
}

async fn create_client(
    State(db): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>), Failure> {
    authorize(&db, &headers).await?;
    let Some(name) = input.name.filter(|n| !n.is_empty()) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Client name is required"));
    };
    let client = Client {
        id: db.next_id(),
        name,
        email: input.email,
        phone: input.phone,
        status: input.status.unwrap_or_else(|| "active".to_string()),
    };
    db.clients.write().await.insert(client.id, client.clone());
    Ok((StatusCode::CREATED, Json(client)))
}

async fn get_client(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Client>, Failure> {
    authorize(&db, &headers).await?;
    let clients = db.clients.read().await;
    clients
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Client not found"))
}

async fn update_client(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>, Failure> {
    authorize(&db, &headers).await?;
    let mut clients = db.clients.write().await;
    let client = clients
        .get_mut(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Client not found"))?;
    if let Some(name) = input.name {
        client.name = name;
    }
    if let Some(email) = input.email {
        client.email = Some(email);
    }
    if let Some(phone) = input.phone {
        client.phone = Some(phone);
    }
    if let Some(status) = input.status {
        client.status = status;
    }
    Ok(Json(client.clone()))
}

async fn delete_client(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    authorize(&db, &headers).await?;
    db.clients
        .write()
        .await
        .remove(&id)
        .map(|_| Json(json!({ "message": "Client deleted" })))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Client not found"))
}

async fn upload(
    State(db): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, Failure> {
    authorize(&db, &headers).await?;

    let mut file: Option<StoredDocument> = None;
    let mut fields = serde_json::Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let original_name = field.file_name().unwrap_or("upload.bin").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
            file = Some(StoredDocument {
                original_name,
                mime_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
            fields.insert(name, Value::String(value));
        }
    }

    let Some(file) = file else {
        return Err(failure(StatusCode::BAD_REQUEST, "No file selected"));
    };
    let id = db.next_id();
    let original_name = file.original_name.clone();
    let size = file.bytes.len();
    db.documents.write().await.insert(id, file);
    info!(id, size, "stored upload");

    Ok(Json(json!({
        "message": "File uploaded",
        "documentId": id,
        "fileName": format!("{id}-{original_name}"),
        "originalName": original_name,
        "fields": fields,
    })))
}

async fn download_document(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    authorize(&db, &headers).await?;
    let documents = db.documents.read().await;
    let document = documents
        .get(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Document not found"))?;
    Ok((
        [(header::CONTENT_TYPE, document.mime_type.clone())],
        document.bytes.clone(),
    )
        .into_response())
}

#[derive(Deserialize)]
struct StatsQuery {
    period: Option<String>,
}

async fn dashboard_stats(
    State(db): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, Failure> {
    authorize(&db, &headers).await?;
    let clients = db.clients.read().await.len();
    Ok(Json(json!({
        "period": query.period.unwrap_or_else(|| "month".to_string()),
        "clients": clients,
    })))
}

async fn health() -> &'static str {
    "ok"
}

async fn broken() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{\"unterminated\": ")
}
