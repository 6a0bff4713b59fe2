use crate::{AssistantError, CommitOrchestrator};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
}

/// Error body returned by every failing route:
/// `{ "error": { "code": "<code>", "message": "<message>" } }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                error: ApiErrorBody {
                    code: code.into(),
                    message: message.into(),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        let (status, code) = match &err {
            AssistantError::LanguageModel(_) => (StatusCode::BAD_GATEWAY, "language_model"),
            AssistantError::InvalidArtifact(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_artifact")
            }
            AssistantError::ArtifactWrite { .. } | AssistantError::VersionControl(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "commit_failed")
            }
            AssistantError::Config(_) | AssistantError::Documentation { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration")
            }
        };
        Self::new(status, code, err.to_string())
    }
}

/// `/chat` plus a liveness route, with CORS open to every origin.
pub fn router(orchestrator: Arc<CommitOrchestrator>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/chat", post(chat_handler))
        // Mirrors origin, method and headers and allows credentials.
        .layer(CorsLayer::very_permissive())
        .with_state(orchestrator)
}

async fn home_handler() -> &'static str {
    "Feature assistant is running. POST {\"text\": ...} to /chat."
}

async fn chat_handler(
    State(orchestrator): State<Arc<CommitOrchestrator>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(message_len = body.text.len(), "chat message received");

    match orchestrator.handle_message(&body.text).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(err) => {
            error!(error = %err, "chat request failed");
            Err(err.into())
        }
    }
}
