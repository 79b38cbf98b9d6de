//! Function declarations written through the header's declaration macros.
//!
//! Six macro spellings introduce a function. They differ only in a few
//! traits (closing punctuation, leading ordinal, trailing attribute), so a
//! single parser handles all of them, parameterized by [`DeclForm`].

use crate::error::{Result, ScanError};
use crate::model::{FunctionDef, Variable};
use crate::scanner::lines::{join_until, LineCursor, Terminator};
use crate::scanner::types::normalize_type;
use std::io::BufRead;

/// The macro a declaration is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclForm {
    /// `typedef PNG_CALLBACK(ret, *name, (params));`
    Callback,
    /// `PNG_FUNCTION(ret, (PNGCAPI *name), (params), attr);`
    Function,
    /// `PNG_EXPORT(ordinal, ret, name, (params));`
    Export,
    /// `PNG_EXPORTA(ordinal, ret, name, (params), attr);`
    ExportA,
    /// `PNG_FP_EXPORT(ordinal, ret, name, (params))`
    FpExport,
    /// `PNG_FIXED_EXPORT(ordinal, ret, name, (params))`
    FixedExport,
}

impl DeclForm {
    const ALL: [DeclForm; 6] = [
        DeclForm::Callback,
        DeclForm::Function,
        DeclForm::Export,
        DeclForm::ExportA,
        DeclForm::FpExport,
        DeclForm::FixedExport,
    ];

    pub fn macro_name(self) -> &'static str {
        match self {
            DeclForm::Callback => "PNG_CALLBACK",
            DeclForm::Function => "PNG_FUNCTION",
            DeclForm::Export => "PNG_EXPORT",
            DeclForm::ExportA => "PNG_EXPORTA",
            DeclForm::FpExport => "PNG_FP_EXPORT",
            DeclForm::FixedExport => "PNG_FIXED_EXPORT",
        }
    }

    /// Which form, if any, `line` opens.
    pub fn detect(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.opens(line))
    }

    fn opens(self, line: &str) -> bool {
        let line = if self == DeclForm::Callback {
            match line.strip_prefix("typedef") {
                Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
                _ => return false,
            }
        } else {
            line
        };
        line.strip_prefix(self.macro_name())
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    }

    pub fn terminator(self) -> Terminator {
        match self {
            DeclForm::FpExport | DeclForm::FixedExport => Terminator::CloseParen,
            _ => Terminator::Semicolon,
        }
    }

    /// Leading ABI ordinal argument.
    pub fn has_ordinal(self) -> bool {
        !self.is_callback()
    }

    /// Trailing `, attribute` argument.
    pub fn has_attribute(self) -> bool {
        matches!(self, DeclForm::ExportA | DeclForm::Function)
    }

    /// Callback typedefs as opposed to exported API functions.
    pub fn is_callback(self) -> bool {
        matches!(self, DeclForm::Callback | DeclForm::Function)
    }
}

/// Parse the declaration opened by `line`, joining continuation lines from
/// `cursor`. The ordinal is read past and dropped.
pub fn parse_function<R: BufRead>(
    line: &str,
    form: DeclForm,
    cursor: &mut LineCursor<R>,
) -> Result<FunctionDef> {
    let joined = join_until(line.to_string(), form.terminator(), cursor)?;
    let line_no = cursor.line_no();
    let malformed = |what: &str| {
        ScanError::format(
            line_no,
            format!("malformed {} declaration ({}): `{}`", form.macro_name(), what, joined),
        )
    };

    let mut text = joined.trim();
    text = text.strip_suffix(';').unwrap_or(text).trim_end();
    text = text
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing `)`"))?
        .trim_end();
    if form.has_attribute() && !text.ends_with(')') {
        text = text
            .rsplit_once(',')
            .map(|(head, _)| head.trim_end())
            .ok_or_else(|| malformed("missing attribute"))?;
    }

    let (_, mut args) = text
        .split_once('(')
        .ok_or_else(|| malformed("missing `(`"))?;
    if form.has_ordinal() {
        args = args
            .split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| malformed("missing ordinal"))?;
    }
    let (return_type, rest) = args
        .split_once(',')
        .ok_or_else(|| malformed("missing return type"))?;
    let (raw_name, params) = rest
        .split_once(',')
        .ok_or_else(|| malformed("missing name"))?;

    let name = declared_name(raw_name).ok_or_else(|| malformed("bad name"))?;
    let params = parse_params(params).ok_or_else(|| malformed("bad parameter list"))?;

    Ok(FunctionDef {
        return_type: normalize_type(return_type),
        name: name.to_string(),
        params,
        ..Default::default()
    })
}

/// `png_read_info`, `*png_error_ptr` or `(PNGCAPI *png_longjmp_ptr)` → the
/// bare identifier.
fn declared_name(raw: &str) -> Option<&str> {
    let mut name = raw.trim();
    if let Some(inner) = name.strip_prefix('(') {
        name = inner.split_whitespace().last()?.trim_end_matches(')');
    }
    let name = name.trim_start_matches('*');
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// `(type name, type name)` → parameters. Types in this dialect never hold
/// commas, so a flat split is enough once the outer group is isolated.
fn parse_params(text: &str) -> Option<Vec<Variable>> {
    let text = text.trim();
    let inner = text.strip_prefix('(')?;
    let mut depth = 1usize;
    let mut close = None;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    if !inner[close + 1..].trim().is_empty() {
        return None;
    }
    let inner = inner[..close].trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }

    Some(
        inner
            .split(',')
            .map(|param| {
                let param = param.trim();
                match param.rsplit_once(' ') {
                    Some((ty, name)) => Variable::param(ty, name),
                    None => Variable::param(param, ""),
                }
            })
            .collect(),
    )
}
