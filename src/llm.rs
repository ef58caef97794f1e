//! Pasarela hacia el runtime del modelo (endpoint de chat estilo Ollama).
//!
//! La pasarela es sin estado: serializa la petición de chat-completion, la
//! envía por HTTP y normaliza la forma de la respuesta. Todo fallo se
//! convierte en un error tipado; nunca en un pánico.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::ChatMessage;

/// Valor de `keep_alive` que pide al runtime no descargar el modelo entre
/// llamadas.
const KEEP_ALIVE_FOREVER: i64 = -1;

/// Errores de la pasarela, distinguibles en la capa HTTP.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// El runtime respondió con un estado no exitoso.
    #[error("el runtime del modelo devolvió {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Respuesta 2xx sin ningún campo de contenido reconocible.
    #[error("formato de respuesta inesperado del runtime del modelo")]
    MalformedResponse,

    /// Fallo de transporte: conexión, timeout o cuerpo ilegible.
    #[error("error de comunicación con el runtime del modelo: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Petición de chat-completion hacia el runtime.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    keep_alive: i64,
    messages: &'a [ChatMessage],
}

/// Formas de respuesta conocidas, en orden de prioridad: el endpoint de
/// chat devuelve `message.content`; otros runtimes responden con
/// `response` o con `content` a secas.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatResponse {
    Chat { message: ResponseMessage },
    Generate { response: String },
    Plain { content: String },
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ChatResponse {
    fn into_content(self) -> String {
        match self {
            ChatResponse::Chat { message } => message.content,
            ChatResponse::Generate { response } => response,
            ChatResponse::Plain { content } => content,
        }
    }
}

/// Pasarela sin estado hacia el endpoint de chat del modelo. Se construye
/// una vez en el arranque y se comparte vía `AppState`.
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaGateway {
    /// Construye la pasarela a partir de la configuración, con un timeout
    /// explícito en el cliente HTTP.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: cfg.ollama_endpoint.clone(),
            model: cfg.chat_model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    /// Envía la lista de mensajes al runtime y devuelve el texto del
    /// asistente, recortado de espacios en blanco en los extremos.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
            keep_alive: KEEP_ALIVE_FOREVER,
            messages,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream { status, body });
        }

        let raw = response.text().await?;
        extract_content(&raw)
    }
}

/// Prueba cada esquema de respuesta conocido en orden fijo de prioridad y
/// falla con un error propio si ninguno encaja.
fn extract_content(raw: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(raw).map_err(|_| GatewayError::MalformedResponse)?;
    Ok(parsed.into_content().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use serde_json::json;

    #[test]
    fn prefers_chat_message_content() {
        let raw = json!({
            "model": "llama3:8b",
            "message": { "role": "assistant", "content": "Reinicia el spooler." },
            "done": true
        })
        .to_string();

        assert_eq!(extract_content(&raw).unwrap(), "Reinicia el spooler.");
    }

    #[test]
    fn falls_back_to_response_field() {
        let raw = json!({ "response": "ok" }).to_string();
        assert_eq!(extract_content(&raw).unwrap(), "ok");
    }

    #[test]
    fn falls_back_to_bare_content_field() {
        let raw = json!({ "content": "respuesta plana" }).to_string();
        assert_eq!(extract_content(&raw).unwrap(), "respuesta plana");
    }

    #[test]
    fn empty_object_is_a_malformed_response() {
        let result = extract_content("{}");
        assert!(matches!(result, Err(GatewayError::MalformedResponse)));
    }

    #[test]
    fn non_json_body_is_a_malformed_response() {
        let result = extract_content("esto no es json");
        assert!(matches!(result, Err(GatewayError::MalformedResponse)));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let raw = json!({ "response": "  con espacios \n" }).to_string();
        assert_eq!(extract_content(&raw).unwrap(), "con espacios");
    }

    #[test]
    fn request_carries_the_full_wire_contract() {
        let messages = vec![ChatMessage { role: Role::User, content: "hola".to_string() }];
        let request = ChatRequest {
            model: "llama3:8b",
            temperature: 0.7,
            max_tokens: 2000,
            stream: false,
            keep_alive: KEEP_ALIVE_FOREVER,
            messages: &messages,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3:8b");
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["keep_alive"], json!(-1));
        assert_eq!(value["max_tokens"], json!(2000));
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hola");
    }
}
