use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::{config::AppConfig, llm::OllamaGateway, rag::RagService};

/// Estado compartido de la aplicación. Los servicios se construyen una sola
/// vez en el arranque y se inyectan en los handlers; no hay singletons
/// globales.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub rag: Arc<RagService>,
    pub gateway: Arc<OllamaGateway>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}
