//! HTTP surface — Axum router for the chat API.
//!
//! Thin plumbing over the agent: one chat endpoint plus health checks.
//! CORS is wide open; callers identify themselves with a `user_id`
//! field only (no authentication).

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agent::AgentRouter;
use crate::types::VenueView;

pub type AppState = Arc<AgentRouter>;

// ---------------------------------------------------------------------------
// Request/response schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Natural language message, e.g. "Find cricket venues in Mumbai".
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub slots_found: Vec<VenueView>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Chat with the agent.
///
/// Venue-search failures are already absorbed below this layer; the
/// handler itself cannot fail short of a malformed request body, which
/// axum rejects before we run.
pub async fn chat(
    State(agent): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let outcome = agent
        .process_message(&request.message, &request.user_id)
        .await;
    Json(ChatResponse {
        response: outcome.response,
        slots_found: outcome.slots_found,
    })
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "VENUEX API is running",
        "status": "healthy"
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub async fn agent_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Agent service is healthy".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Router / server
// ---------------------------------------------------------------------------

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/v1/agents/chat", post(chat))
        .route("/api/v1/agents/health", get(agent_health))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(cors)
        .with_state(state)
}

/// Serve the API until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    info!(port, "API server starting on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .await
        .context("API server error")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderRegistry;
    use crate::service::VenueService;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        // Empty registry: every search resolves to "provider
        // unavailable", which the agent absorbs into "no venues".
        let service = VenueService::new(ProviderRegistry::new(), "playo");
        Arc::new(AgentRouter::new(service, None))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_endpoint_greeting() {
        let app = build_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{ "message": "hello", "user_id": "u1" }"#,
            ))
            .unwrap();

        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["response"]
            .as_str()
            .unwrap()
            .contains("sports booking assistant"));
        assert!(json["slots_found"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_endpoint_search_with_no_provider() {
        let app = build_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{ "message": "cricket in mumbai", "user_id": "u1" }"#,
            ))
            .unwrap();

        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["response"].as_str().unwrap().contains("No venues found"));
    }

    #[tokio::test]
    async fn test_chat_endpoint_rejects_malformed_body() {
        let app = build_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{ "message": 42 }"#))
            .unwrap();

        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
