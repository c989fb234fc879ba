//! In-process fake of the Cupcake server for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::ws::{Message, WebSocket},
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use cupcake::Dashboard;
use cupcake::api::ApiClient;
use cupcake::core::ReconnectBackoff;
use serde_json::{Value, json};
use url::Url;

#[derive(Default)]
pub struct Backend {
    pub jobs: Mutex<Vec<Value>>,
    pub profiles: Mutex<Vec<Value>>,
    /// Live lines served to each tail socket, by job.
    pub tail_lines: Mutex<HashMap<String, Vec<String>>>,
    /// Mutations reply with a `message` only while set.
    pub confirm: AtomicBool,
    /// Fleet sockets close right after their first snapshot while set.
    pub drop_fleet: AtomicBool,
    /// Fleet sockets close without sending any snapshot while set.
    pub silent_fleet: AtomicBool,
    pub fleet_connections: AtomicUsize,
    pub fleet_connected_at: Mutex<Vec<Instant>>,
    pub tail_connections: AtomicUsize,
}

impl Backend {
    fn snapshot(&self) -> String {
        let jobs = self.jobs.lock().unwrap().clone();
        json!({
            "jobs": jobs,
            "health": {"status": "tasty", "crond": "running"}
        })
        .to_string()
    }

    fn reply(&self, message: &str) -> Json<Value> {
        if self.confirm.load(Ordering::SeqCst) {
            Json(json!({ "message": message }))
        } else {
            Json(json!({ "detail": "not saved" }))
        }
    }
}

pub struct FakeServer {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
}

impl FakeServer {
    pub async fn start(backend: Backend) -> Self {
        let backend = Arc::new(backend);
        let app = Router::new()
            .route("/api/profiles", get(list_profiles))
            .route("/api/profile", post(create_profile))
            .route(
                "/api/profile/{name}",
                get(get_profile).delete(delete_profile),
            )
            .route("/api/jobs", get(list_jobs))
            .route("/api/job", post(create_job))
            .route("/api/job/{name}", delete(delete_job))
            .route("/api/job/{name}/logs", get(list_logs))
            .route("/api/job/{name}/stats", get(job_stats))
            .route("/api/job/{name}/log/latest", get(tail_ws))
            .route("/api/job/{name}/log/{index}", get(archived_log))
            .route("/api/health", get(health))
            .route("/ws/cupcake", get(fleet_ws))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, backend }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.base_url(), Duration::from_secs(5)).unwrap()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.api(), fast_backoff())
    }

    pub fn fleet_connections(&self) -> usize {
        self.backend.fleet_connections.load(Ordering::SeqCst)
    }

    /// Time between consecutive fleet connections, in arrival order.
    pub fn fleet_gaps(&self) -> Vec<Duration> {
        let times = self.backend.fleet_connected_at.lock().unwrap();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

pub fn fast_backoff() -> ReconnectBackoff {
    ReconnectBackoff::new(Duration::from_millis(50), Duration::from_millis(150))
}

pub fn job(name: &str) -> Value {
    json!({
        "name": name,
        "schedule": "*/30 * * * *",
        "source": format!("/data/{}", name),
        "destination": format!("s3://bucket/{}", name),
        "profile": "default",
        "storage_class": "STANDARD_IA",
        "uploaded": 3,
        "downloaded": 1,
        "deleted": 0,
        "last_run": 1_700_000_000
    })
}

pub fn profile(name: &str) -> Value {
    json!({
        "name": name,
        "aws_access_key_id": "AKIA",
        "aws_secret_access_key": "secret",
        "region": "eu-west-1",
        "role_arn": ""
    })
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

async fn list_profiles(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.profiles.lock().unwrap().clone()))
}

async fn create_profile(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    if backend.confirm.load(Ordering::SeqCst) {
        backend.profiles.lock().unwrap().push(body);
    }
    backend.reply("Profile added successfully")
}

async fn get_profile(
    State(backend): State<Arc<Backend>>,
    Path(name): Path<String>,
) -> Json<Value> {
    let profiles = backend.profiles.lock().unwrap();
    match profiles.iter().find(|p| p["name"] == name.as_str()) {
        Some(profile) => Json(profile.clone()),
        None => Json(json!({ "error": "Profile not found" })),
    }
}

async fn delete_profile(
    State(backend): State<Arc<Backend>>,
    Path(name): Path<String>,
) -> Json<Value> {
    if backend.confirm.load(Ordering::SeqCst) {
        backend
            .profiles
            .lock()
            .unwrap()
            .retain(|p| p["name"] != name.as_str());
    }
    backend.reply("Profile deleted successfully")
}

async fn list_jobs(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.jobs.lock().unwrap().clone()))
}

async fn create_job(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<Value> {
    if backend.confirm.load(Ordering::SeqCst) {
        backend.jobs.lock().unwrap().push(body);
    }
    backend.reply("Job added successfully")
}

async fn delete_job(
    State(backend): State<Arc<Backend>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    {
        let mut jobs = backend.jobs.lock().unwrap();
        if !jobs.iter().any(|j| j["name"] == name.as_str()) {
            return Err(StatusCode::NOT_FOUND);
        }
        if backend.confirm.load(Ordering::SeqCst) {
            jobs.retain(|j| j["name"] != name.as_str());
        }
    }
    Ok(backend.reply("Job deleted successfully"))
}

async fn job_stats(State(backend): State<Arc<Backend>>, Path(name): Path<String>) -> Json<Value> {
    let jobs = backend.jobs.lock().unwrap();
    match jobs.iter().find(|j| j["name"] == name.as_str()) {
        Some(job) => Json(json!({
            "uploaded": job["uploaded"],
            "downloaded": job["downloaded"],
            "deleted": job["deleted"],
            "last_run": job["last_run"],
        })),
        None => Json(json!({})),
    }
}

async fn list_logs(Path(name): Path<String>) -> Json<Value> {
    Json(json!({
        "name": name,
        "count": 2,
        "logs": [format!("/var/log/{}.log.1", name), format!("/var/log/{}.log.2", name)]
    }))
}

async fn archived_log(Path((name, index)): Path<(String, usize)>) -> String {
    format!("archived {} chunk {}\n", name, index)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "tasty", "crond": "running"}))
}

async fn fleet_ws(ws: WebSocketUpgrade, State(backend): State<Arc<Backend>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| fleet_socket(socket, backend))
}

async fn fleet_socket(mut socket: WebSocket, backend: Arc<Backend>) {
    backend
        .fleet_connected_at
        .lock()
        .unwrap()
        .push(Instant::now());
    backend.fleet_connections.fetch_add(1, Ordering::SeqCst);
    if backend.silent_fleet.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    if socket
        .send(Message::Text(backend.snapshot().into()))
        .await
        .is_err()
    {
        return;
    }
    if backend.drop_fleet.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    drain(socket).await;
}

async fn tail_ws(
    ws: WebSocketUpgrade,
    Path(name): Path<String>,
    State(backend): State<Arc<Backend>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| tail_socket(socket, name, backend))
}

async fn tail_socket(mut socket: WebSocket, job: String, backend: Arc<Backend>) {
    backend.tail_connections.fetch_add(1, Ordering::SeqCst);
    let lines = backend
        .tail_lines
        .lock()
        .unwrap()
        .get(&job)
        .cloned()
        .unwrap_or_default();
    for line in lines {
        if socket.send(Message::Text(line.into())).await.is_err() {
            return;
        }
    }
    drain(socket).await;
}

/// Hold the socket open until the client goes away.
async fn drain(mut socket: WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
    }
}
