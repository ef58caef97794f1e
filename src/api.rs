//! Capa HTTP de la aplicación: endpoint de recuperación, proxy hacia el
//! modelo, estado de la base de conocimientos y apagado ordenado.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    app_state::AppState,
    models::{ChatMessage, Role},
    prompt,
    rag::Status,
};

// --- Payloads y respuestas de la API ---

#[derive(Deserialize)]
pub struct RagQueryPayload {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
pub struct RagQueryResponse {
    context: String,
}

/// Mensaje entrante desde la UI. El rol llega como texto libre y se
/// normaliza en `sanitize_messages`.
#[derive(Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    messages: Vec<IncomingMessage>,
}

#[derive(Serialize)]
pub struct ChatResponsePayload {
    response: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/rag", post(rag_query_handler))
        .route("/api/ollama", post(chat_proxy_handler))
        .route("/api/status", get(status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn rag_query_handler(
    State(state): State<AppState>,
    Json(payload): Json<RagQueryPayload>,
) -> Result<Json<RagQueryResponse>, (StatusCode, Json<serde_json::Value>)> {
    if payload.query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "La consulta no puede estar vacía."})),
        ));
    }

    let context = state.rag.relevant_context(&payload.query).await;
    Ok(Json(RagQueryResponse { context }))
}

#[axum::debug_handler]
async fn chat_proxy_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponsePayload>, (StatusCode, Json<serde_json::Value>)> {
    if payload.messages.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No se han recibido mensajes."})),
        ));
    }

    // Los mensajes 'system' del cliente se descartan: el prompt de sistema
    // lo fija siempre el servidor.
    let conversation = sanitize_messages(&payload.messages);

    let context = if state.config.use_rag {
        match conversation.last() {
            Some(last) if last.role == Role::User => {
                state.rag.relevant_context(&last.content).await
            }
            _ => String::new(),
        }
    } else {
        String::new()
    };

    let messages = prompt::compose(&conversation, &context);

    match state.gateway.complete(&messages).await {
        Ok(response) => Ok(Json(ChatResponsePayload { response })),
        Err(err) => {
            error!("Error consultando el runtime del modelo: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            ))
        }
    }
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<Status> {
    Json(state.rag.status())
}

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    if let Some(sender) = state.shutdown_sender.lock().unwrap().take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}

// --- Utilidades ---

/// Filtra los mensajes 'system' del cliente y normaliza los roles; un rol
/// desconocido se trata como 'user'.
fn sanitize_messages(incoming: &[IncomingMessage]) -> Vec<ChatMessage> {
    incoming
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| {
            let role = match m.role.as_str() {
                "user" => Role::User,
                "assistant" => Role::Assistant,
                _ => Role::User,
            };
            ChatMessage { role, content: m.content.clone() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(role: &str, content: &str) -> IncomingMessage {
        IncomingMessage { role: role.to_string(), content: content.to_string() }
    }

    #[test]
    fn strips_client_system_messages() {
        let messages = vec![
            incoming("system", "prompt inyectado"),
            incoming("user", "hola"),
            incoming("assistant", "buenos días"),
        ];

        let sanitized = sanitize_messages(&messages);
        assert_eq!(sanitized.len(), 2);
        assert!(sanitized.iter().all(|m| m.role != Role::System));
    }

    #[test]
    fn unknown_roles_become_user() {
        let messages = vec![incoming("operador", "no imprime")];
        let sanitized = sanitize_messages(&messages);

        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].role, Role::User);
        assert_eq!(sanitized[0].content, "no imprime");
    }

    #[test]
    fn chat_payload_tolerates_missing_messages_field() {
        let payload: ChatPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.messages.is_empty());
    }

    #[test]
    fn rag_payload_tolerates_missing_query_field() {
        let payload: RagQueryPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.query.is_empty());
    }
}
