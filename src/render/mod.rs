//! Renderer module. Trait-based format dispatch.

pub mod header;
pub mod json;

use crate::model::Model;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Trait for rendering a scanned [`Model`] into a specific output format.
pub trait Renderer {
    fn render(&self, model: &Model) -> Result<String>;
}

/// Output formats selectable with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Loader header spliced into the template.
    Header,
    Json,
}

impl Format {
    pub fn needs_template(self) -> bool {
        matches!(self, Format::Header)
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "header" | "h" => Ok(Format::Header),
            "json" => Ok(Format::Json),
            _ => Err(anyhow!("unknown format: {}. Use header or json", s)),
        }
    }
}

/// Create a renderer for `format`. The header format splices into
/// `template` and fails without one.
pub fn create_renderer(format: Format, template: Option<String>) -> Result<Box<dyn Renderer>> {
    match format {
        Format::Header => {
            let template =
                template.ok_or_else(|| anyhow!("the header format needs a loader template"))?;
            Ok(Box::new(header::HeaderRenderer::new(template)))
        }
        Format::Json => Ok(Box::new(json::JsonRenderer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!("header".parse::<Format>().unwrap(), Format::Header);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(err.to_string().starts_with("unknown format: xml"));
    }

    #[test]
    fn header_requires_template() {
        assert!(create_renderer(Format::Header, None).is_err());
        assert!(create_renderer(Format::Json, None).is_ok());
    }
}
