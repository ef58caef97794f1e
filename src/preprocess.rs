//! Normalización de texto previa a la indexación.

/// Normaliza texto crudo: pasa a minúsculas, sustituye todo carácter que no
/// sea de palabra (alfanumérico o `_`) ni espacio en blanco por un espacio,
/// colapsa los espacios consecutivos y recorta los extremos.
///
/// Función pura y total: la cadena vacía produce la cadena vacía.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize("Hello, WORLD!!  foo_bar"), "hello world foo_bar");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn punctuation_only_collapses_to_empty() {
        assert_eq!(normalize("...!!!  ,,,"), "");
    }

    #[test]
    fn keeps_accented_spanish_words() {
        assert_eq!(
            normalize("La impresión está ATASCADA."),
            "la impresión está atascada"
        );
    }

    #[test]
    fn collapses_newlines_and_tabs() {
        assert_eq!(normalize("uno\n\tdos\r\n   tres"), "uno dos tres");
    }
}
