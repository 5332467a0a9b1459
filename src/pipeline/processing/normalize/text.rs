use crate::constants::{DELIMITER_SUBSTITUTE, FIELD_DELIMITER};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Sanitizes an optional free-text field; absent text becomes empty.
pub fn sanitize_text(input: Option<&str>) -> String {
    input.map(sanitize).unwrap_or_default()
}

/// Makes text safe for the `;`-delimited flat file.
///
/// Line breaks become spaces, the field delimiter is replaced (not removed)
/// and double quotes turn into single quotes. Whitespace runs collapse to a
/// single space. Idempotent.
pub fn sanitize(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| match c {
            '\r' | '\n' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => ' ',
            '"' => '\'',
            c if c == FIELD_DELIMITER => DELIMITER_SUBSTITUTE,
            c => c,
        })
        .collect();
    WHITESPACE_RUN.replace_all(&replaced, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_text_is_empty() {
        assert_eq!(sanitize_text(None), "");
        assert_eq!(sanitize_text(Some("   ")), "");
    }

    #[test]
    fn line_breaks_become_single_spaces() {
        assert_eq!(sanitize("linha 1\r\nlinha 2\nlinha 3\rfim"), "linha 1 linha 2 linha 3 fim");
        assert_eq!(sanitize("a\u{2028}b"), "a b");
    }

    #[test]
    fn delimiter_is_substituted_not_dropped() {
        assert_eq!(sanitize("itens: papel; caneta; grampo"), "itens: papel, caneta, grampo");
    }

    #[test]
    fn quotes_and_tabs_are_neutralised() {
        assert_eq!(sanitize("\"Projeto\"\t\tBairro   Novo"), "'Projeto' Bairro Novo");
    }

    #[test]
    fn output_is_single_line_and_idempotent() {
        let inputs = [
            "",
            "simples",
            "  a;b;\"c\"\n\n\td  ",
            "Aquisição de café;\r\naçúcar\u{0085}e \"água\"",
            ";;;\n;;",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert!(!once.contains('\n') && !once.contains('\r'));
            assert!(!once.contains(FIELD_DELIMITER));
            assert!(!once.contains('"'));
            assert_eq!(sanitize(&once), once);
        }
    }
}
