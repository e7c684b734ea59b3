use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use hyper::ext::ReasonPhrase;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateRecord {
    pub name: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Record>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", get(status))
        .route("/reason/{code}", get(reason))
        .route("/invalid-json", get(invalid_json))
        .route("/soft-error", get(soft_error))
        .route("/records", get(list_records).post(create_record))
        .route("/records/{id}", get(get_record))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((
        status,
        Json(json!({ "errors": [{ "status": code.to_string() }] })),
    ))
}

/// Reason phrase sent on the status line by `/reason/{code}`.
pub const ERROR_REASON: &[u8] = br#"{"errors":[{"detail":"name taken"}]}"#;

/// Error status whose status line carries a JSON error envelope instead of
/// the canonical reason.
async fn reason(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut response = (status, Json(json!({ "status": code }))).into_response();
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(ERROR_REASON));
    response
}

async fn invalid_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<html>not json</html>")
}

async fn soft_error() -> Json<Value> {
    Json(json!({ "errors": [{ "detail": "soft failure" }] }))
}

async fn list_records(State(db): State<Db>) -> Json<Vec<Record>> {
    let records = db.read().await;
    Json(records.values().cloned().collect())
}

async fn create_record(
    State(db): State<Db>,
    Json(input): Json<CreateRecord>,
) -> (StatusCode, Json<Record>) {
    let record = Record {
        id: Uuid::new_v4(),
        name: input.name,
    };
    db.write().await.insert(record.id, record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn get_record(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record>, (StatusCode, Json<Value>)> {
    let records = db.read().await;
    records.get(&id).cloned().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "errors": [{ "status": "404", "detail": "record not found" }] })),
        )
    })
}
