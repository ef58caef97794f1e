//! Base de conocimientos en memoria y ensamblado del contexto RAG.
//!
//! El corpus se construye una única vez por proceso, de forma perezosa, la
//! primera vez que alguien pide contexto. La celda de inicialización
//! serializa a los primeros llamantes concurrentes, de modo que la ingesta
//! nunca se duplica.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::error;

use crate::config::AppConfig;
use crate::ingest;
use crate::models::DocumentChunk;
use crate::rank;

/// Corpus de documentos con inicialización única y perezosa.
pub struct KnowledgeBase {
    root: PathBuf,
    corpus: OnceCell<Vec<DocumentChunk>>,
}

impl KnowledgeBase {
    pub fn new(root: PathBuf) -> Self {
        Self { root, corpus: OnceCell::new() }
    }

    /// Devuelve el corpus, ingiriéndolo en la primera llamada. Un error de
    /// ingesta (p. ej. directorio inexistente) degrada a un corpus vacío:
    /// el servicio sigue respondiendo, simplemente sin contexto.
    pub async fn corpus(&self) -> &[DocumentChunk] {
        self.corpus
            .get_or_init(|| async {
                match ingest::ingest_directory(&self.root).await {
                    Ok((corpus, _summary)) => corpus,
                    Err(err) => {
                        error!("Error inicializando la base de conocimientos: {err}");
                        Vec::new()
                    }
                }
            })
            .await
    }

    fn ready(&self) -> bool {
        self.corpus.initialized()
    }

    fn chunk_count(&self) -> usize {
        self.corpus.get().map(Vec::len).unwrap_or(0)
    }
}

/// Estado observable de la base de conocimientos (`GET /api/status`).
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub ready: bool,
    pub chunks: usize,
}

/// Servicio de recuperación: orquesta la inicialización perezosa, el
/// ranking y el formateo del bloque de contexto con citas.
pub struct RagService {
    kb: KnowledgeBase,
}

impl RagService {
    pub fn new(cfg: &AppConfig) -> Self {
        Self { kb: KnowledgeBase::new(cfg.data_dir.clone()) }
    }

    /// Devuelve el bloque de contexto para una consulta: los chunks más
    /// relevantes, cada uno etiquetado con su fichero de origen y separados
    /// por una línea en blanco. Cadena vacía si no hay resultados.
    pub async fn relevant_context(&self, query: &str) -> String {
        let corpus = self.kb.corpus().await;
        let results = rank::rank(corpus, query, rank::DEFAULT_LIMIT);

        results
            .iter()
            .map(|chunk| format!("[Fuente: {}]\n{}", chunk.metadata.file_name, chunk.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn status(&self) -> Status {
        Status { ready: self.kb.ready(), chunks: self.kb.chunk_count() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn service_for(dir: &Path) -> RagService {
        RagService { kb: KnowledgeBase::new(dir.to_path_buf()) }
    }

    #[tokio::test]
    async fn retrieves_cited_context_for_matching_query() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("printer-issues.txt"),
            "La impresora atascada no imprime: retirar el papel y reiniciar.",
        )
        .unwrap();

        let service = service_for(dir.path());
        let context = service.relevant_context("impresora").await;

        assert!(context.contains("[Fuente: printer-issues]"));
        assert!(context.contains("impresora"));
    }

    #[tokio::test]
    async fn joins_multiple_sources_with_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("impresora-a.txt"), "la impresora a falla").unwrap();
        fs::write(dir.path().join("impresora-b.txt"), "la impresora b falla").unwrap();

        let service = service_for(dir.path());
        let context = service.relevant_context("impresora").await;

        assert_eq!(context.matches("[Fuente: ").count(), 2);
        assert!(context.contains("\n\n"));
    }

    #[tokio::test]
    async fn missing_data_directory_degrades_to_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&dir.path().join("no-existe"));

        let context = service.relevant_context("impresora").await;
        assert_eq!(context, "");

        let status = service.status();
        assert!(status.ready);
        assert_eq!(status.chunks, 0);
    }

    #[tokio::test]
    async fn corpus_is_ingested_only_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("guia.txt"), "texto de la guía").unwrap();

        let service = service_for(dir.path());
        assert!(!service.status().ready);

        let _ = service.relevant_context("guía").await;
        let after_first = service.status();
        assert!(after_first.ready);

        // Añadir documentos tras la inicialización no reabre la ingesta.
        fs::write(dir.path().join("nueva.txt"), "documento posterior").unwrap();
        let _ = service.relevant_context("documento").await;
        assert_eq!(service.status().chunks, after_first.chunks);
    }
}
