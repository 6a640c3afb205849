//! Test utilities for storage layer integration tests

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use graphlink_core::StoreConfig;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// A request received by the stub server
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Scripted stand-in for the Neo4j transactional HTTP endpoint
///
/// Replies with queued responses in order and records every request.
#[derive(Clone, Default)]
pub struct StubNeo4j {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
}

#[allow(dead_code)]
impl StubNeo4j {
    pub fn reply(&self, status: StatusCode, body: Value) -> &Self {
        self.responses.lock().unwrap().push_back((status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Start serving on an ephemeral port and return a config pointing at it
    pub async fn start(&self) -> StoreConfig {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        store_config(addr)
    }
}

async fn handle(
    State(stub): State<StubNeo4j>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    stub.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    let next = stub.responses.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no scripted response").into_response(),
    }
}

pub fn store_config(addr: SocketAddr) -> StoreConfig {
    StoreConfig {
        host: addr.ip().to_string(),
        http_port: addr.port(),
        password: "secret".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

/// Body of a successful response carrying one result per statement
#[allow(dead_code)]
pub fn results(rows_per_statement: Vec<Vec<Value>>) -> Value {
    let results: Vec<Value> = rows_per_statement
        .into_iter()
        .map(|rows| {
            let data: Vec<Value> = rows.into_iter().map(|row| json!({ "row": row })).collect();
            json!({ "columns": [], "data": data })
        })
        .collect();
    json!({ "results": results, "errors": [] })
}

/// Body of an open-transaction response
#[allow(dead_code)]
pub fn open_transaction(config: &StoreConfig, rows_per_statement: Vec<Vec<Value>>) -> Value {
    let mut body = results(rows_per_statement);
    body["commit"] = json!(format!("{}/1/commit", config.transaction_url()));
    body
}

#[allow(dead_code)]
pub fn relationship_row(id: i64, start: i64, rel_type: &str, end: i64, properties: Value) -> Value {
    json!([id, start, rel_type, end, properties])
}

#[allow(dead_code)]
pub fn server_error(code: &str, message: &str) -> Value {
    json!({ "results": [], "errors": [{ "code": code, "message": message }] })
}
