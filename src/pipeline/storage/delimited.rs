//! Minimal delimited-text codec (quotes and CRLF tolerant).
//!
//! Fields are quoted only when they contain the separator, a quote or a line
//! break. Sanitized text never does, so most rows are written unquoted.

use crate::error::{Result, ScraperError};
use std::io::{self, Write};
use std::mem::take;

/// Splits `text` into rows of fields. Blank lines are skipped.
///
/// A quote opens a quoted field only as the first character of the field;
/// elsewhere it is literal text. A quoted field still open at the end of the
/// input is reported as [`ScraperError::CorruptTable`].
pub fn parse_rows(text: &str, sep: char) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line = 1usize;
    let mut quote_line = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            line += 1;
        }
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
                quote_line = line;
            }
            c if c == sep && !in_quotes => {
                row.push(take(&mut field));
                at_field_start = true;
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                    line += 1;
                }
                row.push(take(&mut field));
                at_field_start = true;
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => {
                field.push(ch);
                at_field_start = false;
            }
        }
    }

    if in_quotes {
        return Err(ScraperError::CorruptTable {
            reason: format!("quoted field opened on line {} is never closed", quote_line),
        });
    }

    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }

    Ok(rows)
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes one row terminated by `\n`
pub fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rows: &[Vec<&str>]) -> String {
        let mut out = Vec::new();
        for row in rows {
            write_row(&mut out, row, ';').unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(render(&[vec!["a", "b c", "1.50"]]), "a;b c;1.50\n");
    }

    #[test]
    fn awkward_fields_are_quoted_and_read_back() {
        let text = render(&[vec!["x;y", "say \"hi\"", "two\nlines"]]);
        assert_eq!(text, "\"x;y\";\"say \"\"hi\"\"\";\"two\nlines\"\n");
        assert_eq!(parse_rows(&text, ';').unwrap(), vec![vec!["x;y", "say \"hi\"", "two\nlines"]]);
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let rows = parse_rows("a;b\r\n\r\nc;d\r\n", ';').unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn empty_trailing_fields_are_kept() {
        assert_eq!(parse_rows("a;;\n", ';').unwrap(), vec![vec!["a", "", ""]]);
    }

    #[test]
    fn quote_inside_a_field_is_literal() {
        let rows = parse_rows("a;Compra de 12\" tubos;b\nc;d;e\n", ';').unwrap();
        assert_eq!(rows, vec![vec!["a", "Compra de 12\" tubos", "b"], vec!["c", "d", "e"]]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = parse_rows("a;b\nc;\"open;d\ne;f\n", ';').unwrap_err();
        assert!(matches!(err, ScraperError::CorruptTable { ref reason } if reason.contains("line 2")));
    }
}
