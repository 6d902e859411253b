//! # Mock Service
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide an in-process fake of the
//! `wjr_count_contigs` JSON-RPC service and of the KBase authentication service for
//! integration testing. It is not intended for production use.
//!
//! The server binds an ephemeral port on localhost and exposes:
//!
//! * `POST /rpc` - the `wjr_count_contigs.count_contigs` method.
//! * `GET /auth/api/V2/token` - token validation.
//! * `POST /auth/api/legacy/KBase/Sessions/Login` - user/password login.
use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use axum::http::StatusCode;

pub const COUNT_CONTIGS_METHOD: &str = "wjr_count_contigs.count_contigs";

/// How the `/rpc` endpoint answers.
#[derive(Debug, Clone, Default)]
pub enum ResponseMode {
    /// Serve `count_contigs` from the registered ContigSets.
    #[default]
    Normal,
    /// Answer every call with `200` and this value as the `result` member.
    Result(Value),
    /// Answer every call with this status and raw body.
    Body(StatusCode, String),
    /// Wait before answering normally.
    Delay(Duration),
}

/// A request received on `/rpc`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Default)]
struct Inner {
    contigsets: HashMap<(String, String), i64>,
    tokens: HashMap<String, String>,
    users: HashMap<String, (String, String)>,
    mode: ResponseMode,
    rpc_requests: Vec<RecordedRequest>,
    auth_requests: usize,
}

/// Shared, inspectable state of a [`MockService`].
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ContigSet holding `count` contigs.
    pub fn with_contigset(self, workspace: &str, contigset_id: &str, count: i64) -> Self {
        self.lock()
            .contigsets
            .insert((workspace.to_string(), contigset_id.to_string()), count);
        self
    }

    /// Registers a valid token owned by `user`.
    pub fn with_token(self, token: &str, user: &str) -> Self {
        self.lock()
            .tokens
            .insert(token.to_string(), user.to_string());
        self
    }

    /// Registers a user that logs in with `password` and receives `token`.
    pub fn with_user(self, user: &str, password: &str, token: &str) -> Self {
        {
            let mut inner = self.lock();
            inner
                .users
                .insert(user.to_string(), (password.to_string(), token.to_string()));
            inner.tokens.insert(token.to_string(), user.to_string());
        }
        self
    }

    pub fn set_mode(&self, mode: ResponseMode) {
        self.lock().mode = mode;
    }

    /// Every request received on `/rpc` so far, oldest first.
    pub fn rpc_requests(&self) -> Vec<RecordedRequest> {
        self.lock().rpc_requests.clone()
    }

    /// Number of requests received by the authentication endpoints.
    pub fn auth_requests(&self) -> usize {
        self.lock().auth_requests
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running mock server. The server stops when this is dropped.
pub struct MockService {
    addr: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockService {
    pub async fn start(state: MockState) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL of the JSON-RPC endpoint.
    pub fn rpc_url(&self) -> String {
        format!("http://{}/rpc", self.addr)
    }

    /// Base URL of the authentication service.
    pub fn auth_url(&self) -> String {
        format!("http://{}/auth/", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/rpc", post(rpc))
        .route("/auth/api/V2/token", get(validate_token))
        .route("/auth/api/legacy/KBase/Sessions/Login", post(login))
        .with_state(state)
}

async fn rpc(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return rpc_error(
                None,
                "JSONRPCError",
                -32700,
                "Parse error",
                Some(err.to_string()),
            );
        }
    };

    let mode = {
        let mut inner = state.lock();
        inner.rpc_requests.push(RecordedRequest {
            headers,
            body: request.clone(),
        });
        inner.mode.clone()
    };

    let id = request.get("id").cloned();

    match mode {
        ResponseMode::Normal => {}
        ResponseMode::Delay(delay) => tokio::time::sleep(delay).await,
        ResponseMode::Result(result) => return rpc_result(id, result),
        ResponseMode::Body(status, body) => {
            return (status, [(header::CONTENT_TYPE, "application/json")], body).into_response();
        }
    }

    if request.get("method").and_then(Value::as_str) != Some(COUNT_CONTIGS_METHOD) {
        return rpc_error(id, "JSONRPCError", -32601, "Method not found", None);
    }

    let params = request
        .get("params")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let (workspace, contigset_id) = match params.as_slice() {
        [Value::String(workspace), Value::String(contigset_id)] => (workspace, contigset_id),
        params if params.len() < 2 => {
            return rpc_error(id, "JSONRPCError", -32602, "not enough arguments", None);
        }
        _ => return rpc_error(id, "JSONRPCError", -32602, "Invalid params", None),
    };

    let count = state
        .lock()
        .contigsets
        .get(&(workspace.clone(), contigset_id.clone()))
        .copied();

    match count {
        Some(count) => rpc_result(id, json!([{ "contig_count": count }])),
        None => rpc_error(
            id,
            "ServerError",
            -32500,
            &format!("No ContigSet '{contigset_id}' in workspace '{workspace}'"),
            Some("Traceback (most recent call last): ...".to_string()),
        ),
    }
}

fn rpc_result(id: Option<Value>, result: Value) -> Response {
    Json(json!({ "version": "1.1", "id": id, "result": result })).into_response()
}

fn rpc_error(
    id: Option<Value>,
    name: &str,
    code: i64,
    message: &str,
    data: Option<String>,
) -> Response {
    let body = json!({
        "version": "1.1",
        "id": id,
        "error": { "name": name, "code": code, "message": message, "error": data }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn validate_token(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let user = {
        let mut inner = state.lock();
        inner.auth_requests += 1;
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|token| inner.tokens.get(token).cloned())
    };

    match user {
        Some(user) => Json(json!({ "user": user, "type": "Login", "cachefor": 300000 })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "httpcode": 401,
                    "httpstatus": "Unauthorized",
                    "appcode": 10020,
                    "apperror": "Invalid token",
                    "message": "10020 Invalid token"
                }
            })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct LoginForm {
    user_id: String,
    password: String,
}

async fn login(State(state): State<MockState>, Form(form): Form<LoginForm>) -> Response {
    let token = {
        let mut inner = state.lock();
        inner.auth_requests += 1;
        inner
            .users
            .get(&form.user_id)
            .filter(|(password, _)| *password == form.password)
            .map(|(_, token)| token.clone())
    };

    match token {
        Some(token) => Json(json!({ "user_id": form.user_id, "token": token })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error_msg": "LoginFailure: Authentication failed." })),
        )
            .into_response(),
    }
}
