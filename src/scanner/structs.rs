//! `typedef struct` bodies.

use crate::error::{Result, ScanError};
use crate::model::{StructDef, Variable};
use crate::scanner::lines::{join_until, LineCursor, Terminator};
use crate::scanner::macros::{is_define, parse_macro};
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

static RE_STRUCT_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typedef[[:blank:]]+struct\b(.*)$").unwrap());

/// A `typedef struct` that opens a body. The single-line form ending in
/// `;` is a forward declaration and does not count.
pub fn is_struct_definition(line: &str) -> bool {
    RE_STRUCT_HEAD.is_match(line) && !line.ends_with(';')
}

/// Parse a struct definition whose first line is `line`, consuming the body
/// and the closing `} name;` from `cursor`.
pub fn parse_struct<R: BufRead>(line: &str, cursor: &mut LineCursor<R>) -> Result<StructDef> {
    let rest = RE_STRUCT_HEAD
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| ScanError::format(cursor.line_no(), "expected `typedef struct`"))?;

    let (tag, brace_on_first_line) = match rest.strip_suffix('{') {
        Some(tag) => (tag.trim_end(), true),
        None => (rest, false),
    };
    if tag.contains(char::is_whitespace) {
        return Err(ScanError::format(
            cursor.line_no(),
            format!("unexpected text after struct tag: `{}`", tag),
        ));
    }
    if !brace_on_first_line {
        expect_open_brace(cursor)?;
    }

    let mut def = StructDef {
        tag_name: tag.to_string(),
        ..Default::default()
    };

    loop {
        let Some(line) = cursor.next_normalized()? else {
            return Err(ScanError::truncated(cursor.line_no(), "}"));
        };
        if line.is_empty() {
            continue;
        }
        if is_define(&line) {
            def.nested_macros.push(parse_macro(&line, cursor)?);
            continue;
        }
        // other directives carry no members
        if line.starts_with('#') {
            continue;
        }

        let joined = join_until(line, Terminator::Semicolon, cursor)?;
        let decl = joined.strip_suffix(';').unwrap_or(&joined).trim();
        if let Some(tail) = decl.strip_prefix('}') {
            def.typedef_name = closing_name(tail, cursor.line_no())?;
            return Ok(def);
        }
        def.members.push(parse_member(decl, cursor.line_no())?);
    }
}

fn expect_open_brace<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<()> {
    loop {
        match cursor.next_normalized()?.as_deref() {
            None => return Err(ScanError::truncated(cursor.line_no(), "{")),
            Some("") => continue,
            Some("{") => return Ok(()),
            Some(other) => {
                return Err(ScanError::format(
                    cursor.line_no(),
                    format!("expected `{{` after typedef struct, found `{}`", other),
                ))
            }
        }
    }
}

/// `png_color` from `} png_color` or `} png_color, *png_colorp`. The pointer
/// alias is dropped; the emitter derives its own.
fn closing_name(tail: &str, line_no: usize) -> Result<String> {
    let name = tail.split_once(',').map_or(tail, |(name, _)| name).trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ScanError::format(
            line_no,
            format!("malformed struct typedef name: `{}`", name),
        ));
    }
    Ok(name.to_string())
}

fn parse_member(decl: &str, line_no: usize) -> Result<Variable> {
    if decl.contains(',') {
        return Err(ScanError::format(
            line_no,
            format!("multiple declarators in one member: `{}`", decl),
        ));
    }
    let Some((ty, name)) = decl.rsplit_once(' ') else {
        return Err(ScanError::format(
            line_no,
            format!("struct member without a name: `{}`", decl),
        ));
    };
    Ok(Variable::member(ty, name))
}
