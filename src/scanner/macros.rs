//! `#define` parsing, including backslash-continued definitions.

use crate::error::{Result, ScanError};
use crate::model::Macro;
use crate::scanner::lines::LineCursor;
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

/// `#define` and the indented `#  define` used inside conditionals.
static RE_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[[:blank:]]*define[[:blank:]]+(.*)$").unwrap());

/// `* *` and `( *` spacing left over from the header's formatting.
static RE_STAR_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([(*])[[:blank:]]+\*").unwrap());

pub fn is_define(line: &str) -> bool {
    RE_DEFINE.is_match(line)
}

/// Parse a normalized `#define` line, pulling continuation lines from
/// `cursor` while they end in `\`.
pub fn parse_macro<R: BufRead>(line: &str, cursor: &mut LineCursor<R>) -> Result<Macro> {
    let rest = RE_DEFINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| ScanError::format(cursor.line_no(), "expected `#define`"))?;

    let (definition, continued) = match rest.strip_suffix('\\') {
        Some(definition) => (definition.trim_end(), true),
        None => (rest, false),
    };
    let (name, replacement) = split_macro_name(definition);
    if name.is_empty() {
        return Err(ScanError::format(cursor.line_no(), "`#define` without a name"));
    }

    let mut header_line = if replacement.is_empty() {
        format!("#define {}", name)
    } else {
        format!("#define {} {}", name, replacement)
    };

    let mut body_lines = Vec::new();
    if continued {
        header_line.push_str(" \\");
        loop {
            let Some(raw) = cursor.next_raw()? else {
                return Err(ScanError::truncated(cursor.line_no(), "macro continuation"));
            };
            let (segment, more) = continuation_segment(&raw);
            body_lines.push(segment);
            if !more {
                break;
            }
        }
    }

    Ok(Macro {
        header_line,
        body_lines,
    })
}

/// Split `NAME VALUE` / `NAME(args) VALUE`. Parameter lists stay with the
/// name even when they contain spaces.
fn split_macro_name(definition: &str) -> (&str, &str) {
    let Some(pos) = definition.find(|c: char| c == '(' || c.is_whitespace()) else {
        return (definition, "");
    };
    if definition[pos..].starts_with('(') {
        if let Some(close) = definition[pos..].find(')') {
            let end = pos + close + 1;
            return (&definition[..end], definition[end..].trim());
        }
    }
    (&definition[..pos], definition[pos..].trim())
}

/// Canonical text of one continuation line and whether another follows.
fn continuation_segment(raw: &str) -> (String, bool) {
    let mut text = collapse_star_spacing(raw.trim());
    let more = text.ends_with('\\');
    if more {
        text.pop();
        text.truncate(text.trim_end().len());
    }
    if let Some(pos) = text.find("/*") {
        text.truncate(pos);
        text.truncate(text.trim_end().len());
    }
    if more {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push('\\');
    }
    (text, more)
}

fn collapse_star_spacing(text: &str) -> String {
    let mut out = text.replace('\t', " ");
    while RE_STAR_SPACING.is_match(&out) {
        out = RE_STAR_SPACING.replace_all(&out, "$1*").into_owned();
    }
    out
}
