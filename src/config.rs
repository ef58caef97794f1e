//! Carga y gestión de configuración de la aplicación (servidor, modelo y RAG).

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use url::Url;

/// Configuración completa de la aplicación. Todos los valores tienen un
/// valor por defecto razonable; el `.env` sólo necesita las desviaciones.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,

    /// Endpoint de chat del runtime del modelo.
    pub ollama_endpoint: String,
    pub chat_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,

    /// Si está activo, las consultas al modelo se enriquecen con contexto
    /// recuperado de la base documental.
    pub use_rag: bool,
    /// Raíz del árbol de documentos de la base de conocimientos.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3322".to_string());

        let ollama_endpoint = env::var("OLLAMA_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:11434/api/chat".to_string());
        Url::parse(&ollama_endpoint)
            .map_err(|e| anyhow!("OLLAMA_ENDPOINT no es una URL válida: {e}"))?;

        let chat_model =
            env::var("LLM_CHAT_MODEL").unwrap_or_else(|_| "llama3:8b".to_string());

        let temperature = match env::var("LLM_TEMPERATURE") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow!("LLM_TEMPERATURE no es un número válido: {v}"))?,
            Err(_) => 0.7,
        };

        let max_tokens = match env::var("LLM_MAX_TOKENS") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow!("LLM_MAX_TOKENS no es un entero válido: {v}"))?,
            Err(_) => 2000,
        };

        let request_timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow!("LLM_TIMEOUT_SECS no es un entero válido: {v}"))?,
            Err(_) => 120,
        };

        let use_rag = match env::var("USE_RAG") {
            Ok(v) => match v.to_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => return Err(anyhow!("USE_RAG no es un booleano válido: {other}")),
            },
            Err(_) => true,
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Ok(Self {
            server_addr,
            ollama_endpoint,
            chat_model,
            temperature,
            max_tokens,
            request_timeout_secs,
            use_rag,
            data_dir,
        })
    }
}
