//! Modelos de dominio: mensajes de chat y chunks de la base documental.

use serde::{Deserialize, Serialize};

/// Rol de un mensaje dentro de la conversación con el modelo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Mensaje de chat tal y como viaja hacia el runtime del modelo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Metadatos derivados del fichero de origen.
/// Cada chunk lleva su propia copia; no se modifican tras la creación.
#[derive(Debug, Clone)]
pub struct ChunkMetadata {
    /// Nombre base del fichero, sin extensión.
    pub file_name: String,
    /// Extensión del fichero, en minúsculas.
    pub file_type: String,
    pub file_path: String,
    /// Fecha de última modificación en ISO-8601.
    pub last_modified: String,
    /// Palabras clave derivadas del nombre del fichero.
    pub keywords: Vec<String>,
}

/// Trozo acotado del texto normalizado de un documento; es la unidad de
/// recuperación del sistema.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}
