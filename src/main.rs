// Módulos de la aplicación
mod api;
mod app_state;
mod config;
mod ingest;
mod llm;
mod models;
mod preprocess;
mod prompt;
mod rag;
mod rank;

use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::sync::oneshot;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;

#[tokio::main]
async fn main() {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().expect("Error al cargar la configuración");

    // 3. Construir los servicios: base de conocimientos y pasarela al modelo.
    //    La ingesta de documentos es perezosa; se dispara con la primera consulta.
    let rag_service = Arc::new(rag::RagService::new(&cfg));
    let gateway = Arc::new(
        llm::OllamaGateway::from_config(&cfg).expect("Error inicializando la pasarela al modelo"),
    );

    // Canal para la señal de apagado.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // 4. Estado compartido de la aplicación
    let app_state = AppState {
        config: cfg,
        rag: rag_service,
        gateway,
        shutdown_sender: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    // 5. Router de la API y servicio de ficheros estáticos del frontend
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .fallback_service(ServeDir::new("frontend"))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 6. Iniciar el servidor
    let server_addr = &app_state.config.server_addr;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .expect("No se pudo enlazar la dirección del servidor");
    let server_url = format!("http://{}", server_addr);
    info!("🚀 Servidor escuchando en {}", &server_url);

    // Abrir el frontend en el navegador por defecto
    if webbrowser::open(&server_url).is_err() {
        info!(
            "No se pudo abrir el navegador. Por favor, accede a {} manualmente.",
            server_url
        );
    }

    // Apagado ordenado.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await
        .expect("Error del servidor HTTP");

    info!("✅ Servidor cerrado correctamente.");
}
