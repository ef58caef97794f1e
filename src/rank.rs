//! Clasificación de chunks por solapamiento léxico con la consulta.
//!
//! La puntuación es un recuento entero de coincidencias: cada palabra de la
//! consulta que aparece en el contenido del chunk suma uno, y cada una que
//! aparece en sus palabras clave de metadatos suma dos. Las palabras
//! repetidas de la consulta cuentan tantas veces como aparecen; no se
//! eliminan stop-words.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::DocumentChunk;

/// Número de chunks devueltos por defecto.
pub const DEFAULT_LIMIT: usize = 3;

/// Peso de las coincidencias sobre palabras clave de metadatos.
const METADATA_WEIGHT: usize = 2;

/// Devuelve los `limit` chunks más relevantes para la consulta, de mayor a
/// menor puntuación. Los empates conservan el orden de inserción en el
/// corpus. Un corpus vacío produce un resultado vacío, nunca un error.
pub fn rank<'a>(
    corpus: &'a [DocumentChunk],
    query: &str,
    limit: usize,
) -> Vec<&'a DocumentChunk> {
    let query_words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(usize, &DocumentChunk)> = corpus
        .iter()
        .map(|chunk| (score(chunk, &query_words), chunk))
        .collect();

    // El sort estable de la librería estándar conserva el orden original
    // entre puntuaciones iguales.
    scored.sort_by_key(|(score, _)| Reverse(*score));

    scored.into_iter().take(limit).map(|(_, chunk)| chunk).collect()
}

fn score(chunk: &DocumentChunk, query_words: &[String]) -> usize {
    let content = chunk.content.to_lowercase();
    let content_words: HashSet<&str> = content.split_whitespace().collect();

    let content_matches = query_words
        .iter()
        .filter(|word| content_words.contains(word.as_str()))
        .count();

    let metadata_matches = query_words
        .iter()
        .filter(|word| chunk.metadata.keywords.iter().any(|k| k == *word))
        .count();

    content_matches + METADATA_WEIGHT * metadata_matches
}
