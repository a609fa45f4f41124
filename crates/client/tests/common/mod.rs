//! In-process stub of the booking API for integration tests.
//!
//! Binds an axum router to `127.0.0.1:0` and records what the client sent
//! so tests can assert on request bodies and headers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use podium_client::api::ApiClient;
use podium_client::session::{BypassHeader, Session};

pub const TEST_TOKEN: &str = "test-token";
pub const BYPASS_NAME: &str = "x-preview-bypass";
pub const BYPASS_VALUE: &str = "letmein";

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
    pub bypass: Option<String>,
    pub request_id: Option<String>,
}

pub struct StubState {
    pub project_id: i64,
    pub project: Mutex<Value>,
    pub deals: Value,
    pub projects: Value,
    pub invoices: Value,
    /// Every route answers 500 while set.
    pub fail: AtomicBool,
    /// Only project fetches answer 500 while set.
    pub fail_fetch: AtomicBool,
    /// List routes never answer while set.
    pub stall_lists: AtomicBool,
    pub fetches: AtomicUsize,
    pub requests: Mutex<Vec<Recorded>>,
}

impl StubState {
    pub fn new(project_id: i64, project: Value) -> Self {
        Self {
            project_id,
            project: Mutex::new(project),
            deals: json!([
                { "id": 1, "status": "lead", "deal_value": 10000 },
                { "id": 2, "status": "won", "deal_value": 25000 },
                { "id": 3, "status": "lost", "deal_value": 5000 }
            ]),
            projects: json!({
                "data": [
                    { "id": 12, "status": "pre_event" },
                    { "id": 13, "status": "completed" }
                ]
            }),
            invoices: json!([
                { "id": 1, "status": "sent", "amount": 1500, "due_date": "2000-01-01" },
                { "id": 2, "status": "paid", "amount": 2500 },
                { "id": 3, "status": "not-a-status", "amount": 99 }
            ]),
            fail: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            stall_lists: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_stall_lists(&self, stall: bool) {
        self.stall_lists.store(stall, Ordering::SeqCst);
    }

    pub fn project(&self) -> Value {
        self.project.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }

    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            body,
            authorization: header("authorization"),
            bypass: header(BYPASS_NAME),
            request_id: header("x-request-id"),
        });
    }
}

pub struct StubServer {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubServer {
    /// Client authenticated with [`TEST_TOKEN`] and the bypass header.
    pub fn client(&self) -> ApiClient {
        let bypass = BypassHeader::parse("TEST", &format!("{BYPASS_NAME}:{BYPASS_VALUE}")).unwrap();
        ApiClient::new(
            self.base_url.clone(),
            Session::new(Some(TEST_TOKEN.to_string()), Some(bypass)),
        )
    }
}

pub async fn spawn(state: StubState) -> StubServer {
    let state = Arc::new(state);
    let app = Router::new()
        .route(
            "/api/projects/{id}",
            get(get_project).put(put_project).patch(patch_project),
        )
        .route("/api/upload", post(upload))
        .route("/api/deals", get(list_deals))
        .route("/api/projects", get(list_projects))
        .route("/api/invoices", get(list_invoices))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Shared = State<Arc<StubState>>;

fn unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database unavailable" })),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Project not found" }))).into_response()
}

fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

async fn get_project(State(state): Shared, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    state.record("GET", format!("/projects/{id}"), &headers, Value::Null);
    if state.fail.load(Ordering::SeqCst) || state.fail_fetch.load(Ordering::SeqCst) {
        return unavailable();
    }
    if id != state.project_id {
        return not_found();
    }
    state.fetches.fetch_add(1, Ordering::SeqCst);
    Json(state.project()).into_response()
}

async fn write_project(
    state: Arc<StubState>,
    method: &'static str,
    id: i64,
    headers: HeaderMap,
    body: Value,
) -> Response {
    state.record(method, format!("/projects/{id}"), &headers, body.clone());
    if state.fail.load(Ordering::SeqCst) {
        return unavailable();
    }
    if id != state.project_id {
        return not_found();
    }
    merge(&mut state.project.lock().unwrap(), &body);
    Json(json!({ "success": true })).into_response()
}

async fn put_project(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    write_project(state, "PUT", id, headers, body).await
}

async fn patch_project(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    write_project(state, "PATCH", id, headers, body).await
}

async fn upload(State(state): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let mut file_name = None;
    let mut size = 0usize;
    let mut folder = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(String::from);
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            Some("folder") => folder = field.text().await.ok(),
            _ => {}
        }
    }

    state.record(
        "POST",
        "/upload".to_string(),
        &headers,
        json!({ "file_name": file_name, "size": size, "folder": folder }),
    );

    let Some(file_name) = file_name else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No file provided" }))).into_response();
    };
    if file_name.ends_with(".exe") {
        return Json(json!({ "success": false, "error": "Unsupported file type" })).into_response();
    }

    let folder = folder.unwrap_or_else(|| "uploads".to_string());
    Json(json!({
        "success": true,
        "path": format!("{folder}/{file_name}"),
        "filename": file_name,
    }))
    .into_response()
}

async fn list(state: &StubState, body: &Value) -> Response {
    if state.stall_lists.load(Ordering::SeqCst) {
        std::future::pending::<()>().await;
    }
    if state.fail.load(Ordering::SeqCst) {
        return unavailable();
    }
    Json(body.clone()).into_response()
}

async fn list_deals(State(state): Shared) -> Response {
    list(&state, &state.deals).await
}

async fn list_projects(State(state): Shared) -> Response {
    list(&state, &state.projects).await
}

async fn list_invoices(State(state): Shared) -> Response {
    list(&state, &state.invoices).await
}
