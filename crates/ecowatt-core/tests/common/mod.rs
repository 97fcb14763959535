//! In-process stand-in for the cloud backend.
//!
//! Serves the REST surface the client uses on an ephemeral port and counts
//! the requests that matter for pagination tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use ecowatt_core::CloudClient;

pub struct StoredFirmware {
    pub data: Vec<u8>,
    pub version: String,
    pub level: u8,
    pub file_name: String,
}

#[derive(Default)]
pub struct Backend {
    pub record_total: AtomicU64,
    pub registers: Mutex<Vec<Value>>,
    pub config: Mutex<Value>,
    pub reject_config: AtomicBool,
    pub commands: Mutex<Vec<Value>>,
    pub bare_commands: AtomicBool,
    pub firmware: Mutex<Option<StoredFirmware>>,
    /// `GET /data` requests that carried a filter.
    pub record_fetches: AtomicUsize,
    pub count_fetches: AtomicUsize,
    pub last_record_query: Mutex<HashMap<String, String>>,
}

impl Backend {
    pub fn with_records(total: u64) -> Arc<Self> {
        let backend = Self::default();
        backend.record_total.store(total, Ordering::SeqCst);
        *backend.config.lock().unwrap() = json!({
            "reg_read": [1, 1, 0, 0, 1, 1, 0, 0, 1, 1],
            "interval": 1000,
            "version": "1.0.2"
        });
        *backend.registers.lock().unwrap() = vec![
            json!({"register": 0, "value": 230.5, "timestamp": "2025-10-18T12:00:00"}),
            json!({"register": 4, "value": 12, "timestamp": "2025-10-18T12:00:00"}),
            json!({"register": 12, "value": 1, "timestamp": "2025-10-18T12:00:00"}),
        ];
        Arc::new(backend)
    }

    pub fn record_fetches(&self) -> usize {
        self.record_fetches.load(Ordering::SeqCst)
    }

    pub fn last_record_query(&self) -> HashMap<String, String> {
        self.last_record_query.lock().unwrap().clone()
    }
}

pub fn timestamp_for(id: u64) -> String {
    format!("2025-10-18T{:02}:{:02}:{:02}", 10 + id / 3600, (id / 60) % 60, id % 60)
}

fn record(id: u64) -> Value {
    json!({"id": id, "timestamp": timestamp_for(id), "data": [id as f64, -1]})
}

fn matching_ids(backend: &Backend, params: &HashMap<String, String>) -> Vec<u64> {
    let total = backend.record_total.load(Ordering::SeqCst);
    let bound = |key: &str| params.get(key).and_then(|v| v.parse::<u64>().ok());
    let start_id = bound("start_id").unwrap_or(1);
    let end_id = bound("end_id").unwrap_or(total);

    (start_id.max(1)..=end_id.min(total))
        .filter(|id| {
            let ts = timestamp_for(*id);
            params.get("start_time").map_or(true, |s| ts.as_str() >= s.as_str())
                && params.get("end_time").map_or(true, |e| ts.as_str() <= e.as_str())
        })
        .collect()
}

async fn get_data(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    if params.is_empty() {
        let rows = backend.registers.lock().unwrap().clone();
        return Json(json!({"status": "success", "data": rows}));
    }

    backend.record_fetches.fetch_add(1, Ordering::SeqCst);
    *backend.last_record_query.lock().unwrap() = params.clone();

    let ids = matching_ids(&backend, &params);
    let count = ids.len();
    let offset = params
        .get("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let data: Vec<Value> = ids.into_iter().skip(offset).take(limit).map(record).collect();
    Json(json!({"status": "success", "data": data, "count": count}))
}

async fn get_count(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    backend.count_fetches.fetch_add(1, Ordering::SeqCst);
    let count = matching_ids(&backend, &params).len();
    Json(json!({"status": "success", "count": count}))
}

async fn get_config(State(backend): State<Arc<Backend>>) -> Json<Value> {
    let config = backend.config.lock().unwrap().clone();
    Json(json!({"status": "success", "config": config}))
}

async fn post_config(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<Value> {
    if backend.reject_config.load(Ordering::SeqCst) {
        return Json(json!({"status": "error", "message": "Invalid interval"}));
    }
    let mut config = backend.config.lock().unwrap();
    config["reg_read"] = body["reg_read"].clone();
    config["interval"] = body["interval"].clone();
    Json(json!({"status": "success"}))
}

async fn get_commands(State(backend): State<Arc<Backend>>) -> Json<Value> {
    let commands = backend.commands.lock().unwrap().clone();
    if backend.bare_commands.load(Ordering::SeqCst) {
        Json(Value::Array(commands))
    } else {
        Json(json!({"status": "success", "commands": commands}))
    }
}

async fn post_command(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.commands.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "Command queued"})),
    )
}

async fn post_firmware(
    State(backend): State<Arc<Backend>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut data = None;
    let mut file_name = String::new();
    let mut version = None;
    let mut level = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or_default().to_string();
                data = Some(field.bytes().await.unwrap().to_vec());
            }
            "version" => version = Some(field.text().await.unwrap()),
            "level" => level = field.text().await.unwrap().parse::<u8>().ok(),
            _ => {}
        }
    }

    let (Some(data), Some(version), Some(level)) = (data, version, level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "Invalid version format. Use semantic versioning (e.g., 1.0.0)"})),
        );
    };

    backend.config.lock().unwrap()["version"] = json!(version);
    *backend.firmware.lock().unwrap() = Some(StoredFirmware {
        data,
        version: version.clone(),
        level,
        file_name,
    });

    (
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Firmware uploaded",
            "version": version,
            "update_level": level
        })),
    )
}

async fn get_firmware(State(backend): State<Arc<Backend>>) -> Response {
    let firmware = backend.firmware.lock().unwrap();
    let Some(fw) = firmware.as_ref() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Firmware file not found"})),
        )
            .into_response();
    };

    let mut headers = HeaderMap::new();
    let tag = format!("{}_{}", fw.version, fw.level);
    if let Ok(value) = HeaderValue::from_str(&tag) {
        headers.insert("X-Config-Version", value);
    }
    (headers, fw.data.clone()).into_response()
}

async fn get_firmware_version(State(backend): State<Arc<Backend>>) -> Response {
    let firmware = backend.firmware.lock().unwrap();
    match firmware.as_ref() {
        Some(fw) => Json(json!({
            "status": "success",
            "version": fw.version,
            "level": fw.level,
            "version_string": format!("{}_{}", fw.version, fw.level)
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "No firmware config found"})),
        )
            .into_response(),
    }
}

/// Serve `backend` on an ephemeral local port and return its base URL.
pub async fn spawn(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/data", get(get_data))
        .route("/data/count", get(get_count))
        .route("/config", get(get_config).post(post_config))
        .route("/commands", get(get_commands).post(post_command))
        .route("/firmware", get(get_firmware).post(post_firmware))
        .route("/firmware/version", get(get_firmware_version))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str) -> CloudClient {
    CloudClient::new(base_url, Duration::from_secs(5)).unwrap()
}
