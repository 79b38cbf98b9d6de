//! Loader header renderer.
//!
//! Splices the scanned model into the loader template at two marker lines:
//! struct typedefs go before `// ------ Macros`, macros after it, and the
//! function mapping list plus pointer typedefs go just before
//! `// ------ Function Pointers`. Everything else in the template is copied
//! through unchanged, except its first line.

use crate::model::Model;
use crate::render::Renderer;
use anyhow::{anyhow, Result};

pub const GENERATED_BY: &str = "// This file was generated by pngloader-gen";
pub const MACROS_MARKER: &str = "// ------ Macros";
pub const FUNCTION_POINTERS_MARKER: &str = "// ------ Function Pointers";

/// Placeholder entry so every real entry can start with ` \`.
const MAPPING_HEAD: &str = "    REMOVE_API(png_plz_ignore_this_line)";

pub struct HeaderRenderer {
    template: String,
}

impl HeaderRenderer {
    pub fn new(template: String) -> Self {
        HeaderRenderer { template }
    }
}

impl Renderer for HeaderRenderer {
    fn render(&self, model: &Model) -> Result<String> {
        // first template line is the template's own provenance note
        let mut lines = self.template.split_inclusive('\n').skip(1);
        let mut out = String::new();
        out.push_str(GENERATED_BY);
        out.push('\n');

        let macros_marker = copy_until(&mut lines, MACROS_MARKER, &mut out)?;
        write_structs(model, &mut out);
        out.push_str(macros_marker.trim_end_matches(['\n', '\r']));
        out.push_str("\n\n");
        for m in &model.macros {
            out.push_str(&m.render());
            out.push('\n');
        }

        let pointers_marker = copy_until(&mut lines, FUNCTION_POINTERS_MARKER, &mut out)?;
        write_mapping(model, &mut out);
        write_pointer_types(model, &mut out);

        out.push_str(pointers_marker);
        for line in lines {
            out.push_str(line);
        }
        Ok(out)
    }
}

/// Copy lines to `out` until one starts with `marker`, and return that line.
fn copy_until<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    marker: &str,
    out: &mut String,
) -> Result<&'a str> {
    for line in lines.by_ref() {
        if line.starts_with(marker) {
            return Ok(line);
        }
        out.push_str(line);
    }
    Err(anyhow!("template marker not found: `{}`", marker))
}

fn write_structs(model: &Model, out: &mut String) {
    out.push_str("// public structs\n");
    for def in &model.structs {
        out.push_str(&def.to_typedef());
        out.push('\n');
        out.push_str(&def.pointer_alias());
        out.push_str("\n\n");
    }
}

/// Body of the `LIBPNG_FUNC_MAPPING` macro the template leaves open.
fn write_mapping(model: &Model, out: &mut String) {
    out.push_str(MAPPING_HEAD);
    for func in &model.functions {
        out.push_str(&format!(
            " \\\n    {}({})",
            func.classification.wrapper(),
            func.name
        ));
    }
    out.push_str("\n\n");
}

fn write_pointer_types(model: &Model, out: &mut String) {
    out.push_str("// ------ Callback Types ------\n\n");
    for callback in &model.callbacks {
        out.push_str(&callback.callback_typedef());
        out.push('\n');
    }
    out.push('\n');

    out.push_str("// ------ Function Types ------\n\n");
    for func in &model.functions {
        out.push_str(&func.pointer_typedef());
        out.push('\n');
    }
    out.push('\n');
}
