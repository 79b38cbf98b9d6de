//! Line-level reading: a pull cursor over the header, comment stripping,
//! and joining of declarations that span several physical lines.
//!
//! Every component that needs more input pulls it from the same
//! [`LineCursor`], so the stream position after a call is exactly past the
//! lines that call consumed.

use crate::error::{Result, ScanError};
use std::io::BufRead;

/// Pull-based reader handing out one physical line at a time.
pub struct LineCursor<R> {
    reader: R,
    line_no: usize,
}

impl<'a> LineCursor<&'a [u8]> {
    /// Cursor over in-memory text.
    pub fn from_text(text: &'a str) -> Self {
        LineCursor::new(text.as_bytes())
    }
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        LineCursor { reader, line_no: 0 }
    }

    /// 1-based number of the last line handed out (0 before the first read).
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next raw line without its line terminator, or `None` at end of input.
    pub fn next_raw(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let len = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(len);
        Ok(Some(buf))
    }

    /// Next line with comments and surrounding whitespace removed. May be
    /// empty for comment-only lines.
    pub fn next_normalized(&mut self) -> Result<Option<String>> {
        match self.next_raw()? {
            Some(raw) => normalize_line(&raw, self).map(Some),
            None => Ok(None),
        }
    }
}

/// Strip comments and tabs from `raw`.
///
/// A `/*` without its `*/` on the same line swallows further lines from
/// `cursor` up to the closing `*/`, which must end its line.
pub fn normalize_line<R: BufRead>(raw: &str, cursor: &mut LineCursor<R>) -> Result<String> {
    let mut line = raw.replace('\t', " ");
    loop {
        let line_comment = line.find("//");
        let block_comment = line.find("/*");
        match (line_comment, block_comment) {
            (Some(start), block) if block.map_or(true, |b| start < b) => {
                if line[..start].matches('"').count() % 2 == 1 {
                    return Err(ScanError::format(
                        cursor.line_no(),
                        "`//` inside a string literal is not supported",
                    ));
                }
                line.truncate(start);
                break;
            }
            (_, Some(start)) => {
                if let Some(len) = line[start + 2..].find("*/") {
                    line.replace_range(start..start + 2 + len + 2, " ");
                    continue;
                }
                line.truncate(start);
                skip_block_comment(cursor)?;
                break;
            }
            _ => break,
        }
    }
    Ok(line.trim().to_string())
}

/// Consume lines up to and including the one holding `*/`.
fn skip_block_comment<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<()> {
    loop {
        let Some(raw) = cursor.next_raw()? else {
            return Err(ScanError::truncated(cursor.line_no(), "*/"));
        };
        if let Some(pos) = raw.find("*/") {
            if !raw[pos + 2..].trim().is_empty() {
                return Err(ScanError::format(
                    cursor.line_no(),
                    "text after the end of a multi-line block comment",
                ));
            }
            return Ok(());
        }
    }
}

/// Character that closes a multi-line declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Semicolon,
    /// The `)` that balances the macro's opening `(`, optionally followed
    /// by a stray `;`.
    CloseParen,
}

impl Terminator {
    pub fn as_char(self) -> char {
        match self {
            Terminator::Semicolon => ';',
            Terminator::CloseParen => ')',
        }
    }

    fn is_complete(self, text: &str) -> bool {
        match self {
            Terminator::Semicolon => text.ends_with(';'),
            Terminator::CloseParen => {
                let text = text.strip_suffix(';').unwrap_or(text);
                text.ends_with(')') && text.matches('(').count() == text.matches(')').count()
            }
        }
    }
}

/// Append normalized lines to `first`, one space apart, until it ends with
/// `terminator`. Comment-only lines contribute nothing.
pub fn join_until<R: BufRead>(
    first: String,
    terminator: Terminator,
    cursor: &mut LineCursor<R>,
) -> Result<String> {
    let mut joined = first;
    while !terminator.is_complete(&joined) {
        let Some(line) = cursor.next_normalized()? else {
            return Err(ScanError::truncated(
                cursor.line_no(),
                terminator.as_char().to_string(),
            ));
        };
        if line.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(&line);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> Result<String> {
        let mut cursor = LineCursor::from_text(text);
        let first = cursor.next_raw()?.unwrap_or_default();
        normalize_line(&first, &mut cursor)
    }

    #[test]
    fn strips_line_comment() {
        assert_eq!(normalize("int a; // trailing").unwrap(), "int a;");
        assert_eq!(normalize("// whole line").unwrap(), "");
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(normalize("\tpng_byte\tred;").unwrap(), "png_byte red;");
    }

    #[test]
    fn comment_inside_string_is_rejected() {
        let err = normalize(r#"#define URL "http://libpng.org""#).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn comment_after_balanced_string_is_stripped() {
        assert_eq!(
            normalize(r#"#define VER "1.6" // version"#).unwrap(),
            r#"#define VER "1.6""#
        );
    }

    #[test]
    fn strips_same_line_block_comment() {
        assert_eq!(normalize("/* note */").unwrap(), "");
        assert_eq!(normalize("png_byte red; /* red */").unwrap(), "png_byte red;");
        assert_eq!(normalize("/* a */ int x; /* b */").unwrap(), "int x;");
    }

    #[test]
    fn block_comment_spanning_lines() {
        let mut cursor = LineCursor::from_text("int a; /* start\n * middle\n */\nint b;\n");
        assert_eq!(cursor.next_normalized().unwrap().as_deref(), Some("int a;"));
        assert_eq!(cursor.line_no(), 3);
        assert_eq!(cursor.next_normalized().unwrap().as_deref(), Some("int b;"));
        assert_eq!(cursor.next_normalized().unwrap(), None);
    }

    #[test]
    fn block_comment_end_must_end_line() {
        let mut cursor = LineCursor::from_text("/* start\n end */ int x;\n");
        let err = cursor.next_normalized().unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn unterminated_block_comment_is_truncation() {
        let mut cursor = LineCursor::from_text("/* never closed\n more\n");
        let err = cursor.next_normalized().unwrap_err();
        assert!(matches!(err, ScanError::Truncated { .. }));
    }

    #[test]
    fn trim_and_strip_commute() {
        let line = "  png_byte red;  // comment  ";
        let stripped_then_trimmed = normalize(line).unwrap();
        let trimmed_then_stripped = normalize(line.trim()).unwrap();
        assert_eq!(stripped_then_trimmed, trimmed_then_stripped);
    }

    #[test]
    fn joins_to_semicolon() {
        let mut cursor = LineCursor::from_text("    int b,\n\n    /* skipped */\n    int c);\nnext\n");
        let joined = join_until("f(int a,".to_string(), Terminator::Semicolon, &mut cursor).unwrap();
        assert_eq!(joined, "f(int a, int b, int c);");
        assert_eq!(cursor.next_normalized().unwrap().as_deref(), Some("next"));
    }

    #[test]
    fn already_terminated_reads_nothing() {
        let mut cursor = LineCursor::from_text("untouched\n");
        let joined = join_until("x;".to_string(), Terminator::Semicolon, &mut cursor).unwrap();
        assert_eq!(joined, "x;");
        assert_eq!(cursor.line_no(), 0);
    }

    #[test]
    fn close_paren_waits_for_balance() {
        let mut cursor = LineCursor::from_text("    png_voidp (b),\n    double c))\n");
        let joined = join_until(
            "M(1, void, f, (double a,".to_string(),
            Terminator::CloseParen,
            &mut cursor,
        )
        .unwrap();
        assert_eq!(joined, "M(1, void, f, (double a, png_voidp (b), double c))");
        assert_eq!(cursor.line_no(), 2);
    }

    #[test]
    fn truncated_join_is_an_error() {
        let mut cursor = LineCursor::from_text("  int b,\n");
        let err = join_until("f(int a,".to_string(), Terminator::Semicolon, &mut cursor).unwrap_err();
        match err {
            ScanError::Truncated { line, expected } => {
                assert_eq!(line, 1);
                assert_eq!(expected, ";");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
