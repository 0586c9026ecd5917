//! MCP over HTTP: JSON-RPC on `POST /mcp`, sessions keyed by `Mcp-Session-Id`.

use crate::mcp::protocol::{JsonRpcError, JsonRpcId, JsonRpcResponse};
use crate::mcp::{McpServer, SERVER_NAME};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Clone)]
pub struct HttpState {
    server: McpServer,
    auth_token: Option<Arc<str>>,
    sessions: Arc<RwLock<HashSet<String>>>,
}

impl HttpState {
    /// `auth_token: None` disables bearer checks.
    pub fn new(server: McpServer, auth_token: Option<String>) -> Self {
        Self {
            server,
            auth_token: auth_token.map(Arc::from),
            sessions: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    async fn is_live(&self, session: Option<&str>) -> bool {
        match session {
            Some(id) => self.sessions.read().await.contains(id),
            None => false,
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// JSON-RPC error body with a null id, as used for transport-level rejections.
fn rpc_error(status: StatusCode, error: JsonRpcError) -> Response {
    (status, Json(JsonRpcResponse::error(JsonRpcId::Null, error))).into_response()
}

async fn require_bearer(State(state): State<HttpState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(request).await;
    };
    let rejection = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        None => Some("Unauthorized: Missing or invalid Authorization header"),
        Some(token) if token != expected => Some("Unauthorized: Invalid token"),
        Some(_) => None,
    };
    match rejection {
        Some(message) => {
            tracing::warn!(uri = %request.uri(), "{}", message);
            rpc_error(StatusCode::UNAUTHORIZED, JsonRpcError::server_error(message))
        }
        None => next.run(request).await,
    }
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

async fn post_mcp(State(state): State<HttpState>, headers: HeaderMap, body: Bytes) -> Response {
    let message: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                JsonRpcError::parse_error(format!("Parse error: {e}")),
            )
        }
    };

    let is_initialize = message.get("method").and_then(Value::as_str) == Some("initialize");
    let requested = session_id(&headers);
    let known = state.is_live(requested).await;
    // A new session is only registered once its initialize succeeds.
    let (session, created) = match requested {
        Some(id) if known => (id.to_string(), false),
        None if is_initialize => (uuid::Uuid::new_v4().to_string(), true),
        _ => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                JsonRpcError::server_error("Bad Request: No valid session ID provided"),
            )
        }
    };

    let response = match serde_json::from_value(message) {
        Ok(request) => state.server.handle(request).await,
        Err(e) => Some(JsonRpcResponse::error(
            JsonRpcId::Null,
            JsonRpcError::invalid_request(format!("Invalid request: {e}")),
        )),
    };

    let established = !created || matches!(&response, Some(r) if r.error.is_none());
    if created && established {
        state.sessions.write().await.insert(session.clone());
        tracing::info!(session_id = %session, "MCP session created");
    }

    let mut reply = match response {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    if established {
        if let Ok(value) = HeaderValue::from_str(&session) {
            reply.headers_mut().insert(SESSION_HEADER, value);
        }
    }
    reply
}

fn invalid_session() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid or missing session ID").into_response()
}

/// No server-initiated stream is offered; a valid session just learns that.
async fn get_mcp(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    if state.is_live(session_id(&headers)).await {
        (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST, DELETE")]).into_response()
    } else {
        invalid_session()
    }
}

async fn delete_mcp(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return invalid_session();
    };
    if state.sessions.write().await.remove(id) {
        tracing::info!(session_id = %id, "MCP session closed");
        StatusCode::OK.into_response()
    } else {
        invalid_session()
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: HttpState) -> Router {
    let mcp = Router::new()
        .route("/mcp", post(post_mcp).get(get_mcp).delete(delete_mcp))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));
    Router::new()
        .merge(mcp)
        .route("/health", get(health))
        .with_state(state)
}

/// Serve on `0.0.0.0:port` until `shutdown` resolves.
pub async fn run_http<F>(server: McpServer, port: u16, auth_token: Option<String>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(url = %format!("http://{addr}/mcp"), "Slack MCP server listening");

    axum::serve(listener, router(HttpState::new(server, auth_token)))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server")?;
    tracing::info!("HTTP server closed");
    Ok(())
}
