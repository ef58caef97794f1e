//! Composición del prompt enviado al modelo: el prompt de sistema fijo de
//! FixIT más, opcionalmente, el contexto recuperado de la base documental.

use crate::models::{ChatMessage, Role};

/// Prompt de sistema del asistente técnico del hospital.
pub const SYSTEM_PROMPT: &str = r#"
Eres "FixIT", el asistente técnico oficial del Hospital Sant Joan de Déu.

1. **Rol y contexto**
   - Eres un técnico informático especializado en entornos sanitarios.
   - Conoces la infraestructura y protocolos de un hospital: red interna, HIS, PACS, estaciones de trabajo, impresoras y dispositivos médicos conectados.

2. **Objetivo**
   - Resolver dudas y problemas técnicos de forma rápida y fiable.
   - Si no sabes la respuesta exacta, di "No dispongo de esa información" y sugiere escalar al equipo de soporte de nivel 2 o documentar el caso.

3. **Proceso RAG**
   - Antes de responder, revisa la base de conocimientos interna (documentación, guías, FAQs).
   - Si citas una fuente, indícalo entre corchetes (por ejemplo: [KB-IMP1]).
   - Usa fragmentos de manuales o ejemplos de comandos para ilustrar la solución.

4. **Estilo de respuesta**
   - Profesional y conciso (2-4 párrafos como máximo).
   - Tono amable y cercano, sin coloquialismos excesivos.
   - Incluye pasos numerados o viñetas para los procedimientos.

5. **Manejo de errores**
   - Si el usuario da datos insuficientes, pide información concreta: sistema operativo, modelo de impresora, capturas de logs.
   - Si el problema queda fuera de tu ámbito, deriva al Soporte de TI Nivel 2 indicando los detalles recopilados.
"#;

/// Construye la lista definitiva de mensajes para el modelo.
///
/// Con contexto recuperado no vacío, la conversación se colapsa en
/// exactamente dos mensajes: el prompt de sistema y un único turno de
/// usuario sintético con el contexto y la última pregunta; los turnos
/// anteriores no se envían al modelo. Sin contexto (o con RAG
/// desactivado), se conserva el historial completo tras el prompt de
/// sistema.
pub fn compose(conversation: &[ChatMessage], context: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];

    if context.is_empty() {
        messages.extend(conversation.iter().cloned());
        return messages;
    }

    let last_user = conversation
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    messages.push(ChatMessage::user(format!(
        "Contexto relevante:\n{context}\n\nPregunta del usuario:\n{last_user}"
    )));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_turns() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("la impresora no imprime"),
            ChatMessage { role: Role::Assistant, content: "¿Qué modelo es?".to_string() },
            ChatMessage::user("una HP de radiología"),
            ChatMessage { role: Role::Assistant, content: "Prueba a reiniciarla.".to_string() },
        ]
    }

    #[test]
    fn context_collapses_history_to_two_messages() {
        let messages = compose(&four_turns(), "[Fuente: printer-issues]\ntexto");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.starts_with("Contexto relevante:\n"));
        assert!(messages[1].content.contains("Pregunta del usuario:\nuna HP de radiología"));
    }

    #[test]
    fn empty_context_preserves_full_history() {
        let conversation = four_turns();
        let messages = compose(&conversation, "");

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        for (sent, original) in messages[1..].iter().zip(&conversation) {
            assert_eq!(sent.role, original.role);
            assert_eq!(sent.content, original.content);
        }
    }

    #[test]
    fn synthetic_turn_quotes_last_user_message() {
        // El último turno es del asistente; la pregunta enriquecida debe
        // usar el último turno de usuario, no el último mensaje.
        let messages = compose(&four_turns(), "contexto");
        assert!(messages[1].content.ends_with("una HP de radiología"));
    }
}
