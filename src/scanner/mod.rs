//! Header scanner. Drives the declaration parsers over the header one
//! normalized line at a time.
//!
//! Parsers are called synchronously and pull their own continuation lines
//! from the shared cursor, so the only state kept here is the conditional
//! compilation stack and whether an `#else` branch is being skipped.

pub mod functions;
pub mod lines;
pub mod macros;
pub mod structs;
pub mod types;

use crate::error::Result;
use crate::model::Model;
use functions::{parse_function, DeclForm};
use lines::LineCursor;
use macros::{is_define, parse_macro};
use std::io::BufRead;
use structs::{is_struct_definition, parse_struct};
use tracing::debug;

/// Scan a whole header into a [`Model`].
pub fn scan<R: BufRead>(reader: R) -> Result<Model> {
    Scanner::new(LineCursor::new(reader)).run()
}

/// Scan in-memory header text.
pub fn scan_str(text: &str) -> Result<Model> {
    scan(text.as_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// Inside the `#else` of a `#ifdef ..._SUPPORTED`; `depth` counts
    /// conditionals opened since.
    SkipElse { depth: usize },
}

struct Scanner<R> {
    cursor: LineCursor<R>,
    model: Model,
    /// One entry per open conditional: true for `#ifdef ..._SUPPORTED`.
    conditionals: Vec<bool>,
    state: State,
}

impl<R: BufRead> Scanner<R> {
    fn new(cursor: LineCursor<R>) -> Self {
        Scanner {
            cursor,
            model: Model::default(),
            conditionals: Vec::new(),
            state: State::Normal,
        }
    }

    fn run(mut self) -> Result<Model> {
        while let Some(line) = self.cursor.next_normalized()? {
            if line.is_empty() {
                continue;
            }
            match self.state {
                State::SkipElse { depth } => self.skip(&line, depth),
                State::Normal => self.dispatch(&line)?,
            }
        }
        Ok(self.model)
    }

    fn dispatch(&mut self, line: &str) -> Result<()> {
        if is_define(line) {
            let m = parse_macro(line, &mut self.cursor)?;
            debug!(line = self.cursor.line_no(), definition = %m.header_line, "macro");
            self.model.macros.push(m);
            return Ok(());
        }

        if let Some(directive) = directive(line) {
            self.track_conditional(directive, line);
            return Ok(());
        }

        if is_struct_definition(line) {
            let mut def = parse_struct(line, &mut self.cursor)?;
            debug!(line = self.cursor.line_no(), name = %def.typedef_name, "struct");
            self.model.macros.append(&mut def.nested_macros);
            self.model.structs.push(def);
            return Ok(());
        }

        if let Some(form) = DeclForm::detect(line) {
            let func = parse_function(line, form, &mut self.cursor)?;
            debug!(line = self.cursor.line_no(), name = %func.name, form = form.macro_name(), "function");
            if form.is_callback() {
                self.model.callbacks.push(func);
            } else {
                self.model.functions.push(func);
            }
        }
        Ok(())
    }

    fn track_conditional(&mut self, directive: &str, line: &str) {
        match directive {
            "ifdef" => self.conditionals.push(line.contains("SUPPORTED")),
            "if" | "ifndef" => self.conditionals.push(false),
            "else" if self.conditionals.last() == Some(&true) => {
                debug!(line = self.cursor.line_no(), "skipping #else branch");
                self.state = State::SkipElse { depth: 0 };
            }
            "endif" => {
                self.conditionals.pop();
            }
            _ => {}
        }
    }

    fn skip(&mut self, line: &str, depth: usize) {
        match directive(line) {
            Some("if" | "ifdef" | "ifndef") => {
                self.state = State::SkipElse { depth: depth + 1 };
            }
            Some("endif") if depth == 0 => {
                self.conditionals.pop();
                self.state = State::Normal;
            }
            Some("endif") => {
                self.state = State::SkipElse { depth: depth - 1 };
            }
            _ => {}
        }
    }
}

/// Directive keyword of a preprocessor line: `#  ifdef X` → `ifdef`.
fn directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
