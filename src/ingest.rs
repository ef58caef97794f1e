//! Ingesta de la base de conocimientos: recorrido recursivo de un
//! directorio, lectura de ficheros de texto, normalización y troceado en
//! chunks con metadatos del fichero de origen.

use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::models::{ChunkMetadata, DocumentChunk};
use crate::preprocess;

/// Longitud objetivo de cada chunk, en caracteres. El corte se ajusta a la
/// frontera de palabra más cercana dentro de la ventana.
const CHUNK_TARGET_CHARS: usize = 1000;

/// Extensiones reconocidas como fuente de documentos.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt"];

/// Resumen de los resultados de una operación de ingesta.
#[derive(Debug, Default)]
pub struct IngestionSummary {
    pub files_scanned: u32,
    pub files_ingested: u32,
    pub files_skipped: u32,
    pub chunks_created: usize,
}

impl std::fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumen: {} ficheros escaneados, {} ingeridos, {} omitidos. {} chunks creados.",
            self.files_scanned, self.files_ingested, self.files_skipped, self.chunks_created
        )
    }
}

/// Recorre recursivamente un directorio leyendo los ficheros soportados y
/// devuelve el corpus de chunks junto con el resumen de la pasada.
///
/// La ingesta es best-effort: los errores por fichero o por entrada del
/// recorrido se registran y no interrumpen el procesamiento del resto.
pub async fn ingest_directory(root: &Path) -> Result<(Vec<DocumentChunk>, IngestionSummary)> {
    if !root.is_dir() {
        return Err(anyhow!("La ruta no es un directorio: {}", root.display()));
    }

    let file_entries: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("Entrada ilegible durante el recorrido: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .collect();

    let mut corpus = Vec::new();
    let mut summary = IngestionSummary::default();

    for entry in &file_entries {
        summary.files_scanned += 1;
        let path = entry.path();

        match ingest_file(path).await {
            Ok(Some(chunks)) => {
                summary.files_ingested += 1;
                summary.chunks_created += chunks.len();
                corpus.extend(chunks);
            }
            Ok(None) => summary.files_skipped += 1,
            Err(err) => {
                summary.files_skipped += 1;
                warn!("Error ingiriendo {}: {err}", path.display());
            }
        }
    }

    info!("{summary}");
    Ok((corpus, summary))
}

/// Procesa un único fichero. Devuelve `None` si la extensión no está
/// soportada o el fichero no aporta texto útil.
async fn ingest_file(path: &Path) -> Result<Option<Vec<DocumentChunk>>> {
    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        warn!(
            "Saltando fichero con extensión no soportada ('.{}'): {}",
            extension,
            path.display()
        );
        return Ok(None);
    }

    let raw = tokio::fs::read_to_string(path).await?;
    let normalized = preprocess::normalize(&raw);
    if normalized.is_empty() {
        warn!("Fichero vacío o sin texto útil: {}", path.display());
        return Ok(None);
    }

    let metadata = file_metadata(path, &extension).await?;
    let chunks: Vec<DocumentChunk> = split_into_chunks(&normalized, CHUNK_TARGET_CHARS)
        .into_iter()
        .filter(|content| !content.is_empty())
        .map(|content| DocumentChunk { content, metadata: metadata.clone() })
        .collect();

    info!("Ingerido {} con {} chunks.", path.display(), chunks.len());
    Ok(Some(chunks))
}

/// Construye los metadatos compartidos por todos los chunks de un fichero.
async fn file_metadata(path: &Path, extension: &str) -> Result<ChunkMetadata> {
    let stat = tokio::fs::metadata(path).await?;
    let modified: DateTime<Utc> = stat
        .modified()
        .ok()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(Utc::now);

    let stem = path
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_string();

    Ok(ChunkMetadata {
        file_name: stem.clone(),
        file_type: extension.to_string(),
        file_path: path.to_string_lossy().to_string(),
        last_modified: modified.to_rfc3339(),
        keywords: keywords_from(&stem),
    })
}

/// Deriva las palabras clave del nombre base del fichero, separando por
/// `-`, `_` y espacios en blanco y descartando los tokens vacíos.
fn keywords_from(stem: &str) -> Vec<String> {
    stem.to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trocea texto normalizado en runs de hasta `target` caracteres, cada uno
/// terminado en una frontera de palabra o en el final del texto. Si el
/// corte cae en mitad de una palabra se retrocede hasta el último espacio
/// de la ventana; una palabra más larga que la ventana se corta en seco.
/// El espacio de frontera se consume y no pertenece a ningún chunk; el
/// último chunk de un texto puede ser más corto.
fn split_into_chunks(text: &str, target: usize) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let remaining = chars.len() - start;
        let take = if remaining <= target {
            remaining
        } else if chars[start + target].1.is_whitespace() {
            target
        } else {
            match (start..start + target).rev().find(|&i| chars[i].1.is_whitespace()) {
                Some(ws) => ws - start,
                None => target,
            }
        };

        let end = start + take;
        let start_byte = chars[start].0;
        let end_byte = if end < chars.len() { chars[end].0 } else { text.len() };
        chunks.push(text[start_byte..end_byte].to_string());

        // Saltar el espacio de frontera (la normalización garantiza que es
        // un único carácter).
        start = end;
        if start < chars.len() && chars[start].1.is_whitespace() {
            start += 1;
        }
    }

    chunks
}
