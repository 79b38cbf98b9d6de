//! pngloader-gen: regenerate the libpng loader header from `png.h`.
//!
//! Reads the public declarations out of `png.h`, classifies the exported
//! functions, and splices everything into `libpng-loader-base.h`:
//!
//! - `pngloader-gen --png-h /usr/include/png.h` writes `libpng-loader-generated.h`
//! - `pngloader-gen --overwrite-loader` writes `libpng-loader.h` instead
//! - `pngloader-gen -f json -o -` dumps the scanned model to stdout

use anyhow::{Context, Result};
use clap::Parser;
use pngloader_gen::classify::{classify, KeywordSet};
use pngloader_gen::model::{Classification, FunctionDef, Model};
use pngloader_gen::render::{self, Format};
use std::fs::{self, File};
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "pngloader-gen",
    version,
    about = "Generate the libpng loader header from png.h"
)]
struct Cli {
    /// Path to png.h
    #[arg(long, default_value = "png.h")]
    png_h: PathBuf,

    /// Path to the loader template
    #[arg(long, default_value = "libpng-loader-base.h")]
    base_h: PathBuf,

    /// Output path, `-` for stdout.
    /// Defaults to libpng-loader-generated.h (libpng-loader.h with --overwrite-loader)
    #[arg(short = 'o', long)]
    generated_h: Option<PathBuf>,

    /// Overwrite libpng-loader.h instead of generating libpng-loader-generated.h
    #[arg(long)]
    overwrite_loader: bool,

    /// Comma-separated keywords; functions containing one become optional
    #[arg(long, default_value = "eXIf,cICP,mDCV,cLLI")]
    optional_keywords: String,

    /// Comma-separated keywords; functions containing one are removed
    #[arg(long, default_value = "stdio,init_io")]
    remove_keywords: String,

    /// Comma-separated function names to make optional
    #[arg(long, default_value = "png_err,png_set_strip_error_numbers")]
    optional_functions: String,

    /// Comma-separated function names to remove from the loader
    #[arg(long, default_value = "")]
    remove_functions: String,

    /// Output format: header (default), json
    #[arg(short = 'f', long, default_value = "header")]
    format: String,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        match &self.generated_h {
            Some(path) => path.clone(),
            None if self.overwrite_loader => PathBuf::from("libpng-loader.h"),
            None => PathBuf::from("libpng-loader-generated.h"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pngloader_gen=info")),
        )
        .init();

    let cli = Cli::parse();
    let format: Format = cli.format.parse()?;

    let mut model = read_header(&cli.png_h)?;
    let optional = KeywordSet::from_lists(&cli.optional_keywords, &cli.optional_functions);
    let remove = KeywordSet::from_lists(&cli.remove_keywords, &cli.remove_functions);
    classify(&mut model.functions, &optional, &remove);
    log_summary(&model);

    let template = if format.needs_template() {
        info!(path = %cli.base_h.display(), "reading template");
        let text = fs::read_to_string(&cli.base_h)
            .with_context(|| format!("failed to read {}", cli.base_h.display()))?;
        Some(text)
    } else {
        None
    };

    let renderer = render::create_renderer(format, template)?;
    let output = renderer.render(&model)?;
    write_output(&cli.output_path(), &output)
}

fn read_header(path: &Path) -> Result<Model> {
    info!(path = %path.display(), "reading header");
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    pngloader_gen::scan(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn log_summary(model: &Model) {
    info!(
        callbacks = model.callbacks.len(),
        functions = model.functions.len(),
        structs = model.structs.len(),
        macros = model.macros.len(),
        "scanned header"
    );

    let optional = names_with(&model.functions, Classification::Optional);
    if !optional.is_empty() {
        info!(functions = %optional.join(", "), "marked optional, can be null at runtime");
    }
    let removed = names_with(&model.functions, Classification::Removed);
    if !removed.is_empty() {
        info!(functions = %removed.join(", "), "removed from the loader");
    }
}

fn names_with(functions: &[FunctionDef], classification: Classification) -> Vec<&str> {
    functions
        .iter()
        .filter(|f| f.classification == classification)
        .map(|f| f.name.as_str())
        .collect()
}

fn write_output(path: &Path, output: &str) -> Result<()> {
    if path == Path::new("-") {
        io::stdout()
            .write_all(output.as_bytes())
            .context("failed to write stdout")?;
        return Ok(());
    }
    info!(path = %path.display(), "writing output");
    fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path() {
        let cli = Cli::parse_from(["pngloader-gen"]);
        assert_eq!(cli.output_path(), PathBuf::from("libpng-loader-generated.h"));
    }

    #[test]
    fn overwrite_loader_output_path() {
        let cli = Cli::parse_from(["pngloader-gen", "--overwrite-loader"]);
        assert_eq!(cli.output_path(), PathBuf::from("libpng-loader.h"));
    }

    #[test]
    fn explicit_output_wins() {
        let cli = Cli::parse_from(["pngloader-gen", "--overwrite-loader", "-o", "out.h"]);
        assert_eq!(cli.output_path(), PathBuf::from("out.h"));
    }

    #[test]
    fn names_by_classification() {
        let functions = vec![
            FunctionDef {
                name: "png_a".to_string(),
                ..Default::default()
            },
            FunctionDef {
                name: "png_b".to_string(),
                classification: Classification::Removed,
                ..Default::default()
            },
        ];
        assert_eq!(names_with(&functions, Classification::Removed), vec!["png_b"]);
        assert_eq!(names_with(&functions, Classification::Required), vec!["png_a"]);
    }
}
