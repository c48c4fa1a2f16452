//! Renderer module
//!
//! Renders assembled documents to the selected output format: md or json.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The text document itself
    #[default]
    Markdown,
    /// A structured report including the document
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" | "text" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Anything the CLI can print: a markdown view plus a serializable report
pub trait Document: Serialize {
    fn to_markdown(&self) -> String;
}

/// Renderer for documents
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a document to a string
    pub fn render<D: Document>(&self, doc: &D) -> Result<String> {
        match self.config.format {
            OutputFormat::Markdown => Ok(doc.to_markdown()),
            OutputFormat::Json => {
                let json = if self.config.pretty {
                    serde_json::to_string_pretty(doc)
                } else {
                    serde_json::to_string(doc)
                };
                json.context("Failed to serialize report")
            }
        }
    }

    /// Render to stdout, or to `output` when given (parent dirs are created)
    pub fn emit<D: Document>(&self, doc: &D, output: Option<&Path>) -> Result<()> {
        let rendered = self.render(doc)?;

        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
                fs::write(path, format!("{}\n", rendered))
                    .with_context(|| format!("Failed to write output: {}", path.display()))?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", rendered).context("Failed to write to stdout")?;
            }
        }

        Ok(())
    }
}
