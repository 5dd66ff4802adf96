//! Output controls shared by the inspection binaries.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Knobs applied to records before they are written out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    category: Option<String>,
    base_url: Option<Url>,
}

impl OutputOptions {
    /// Constructs a new set of output options.
    pub fn new(category: Option<String>, base_url: Option<Url>) -> Self {
        Self { category, base_url }
    }

    /// Raw category tag records must carry to be emitted.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Base URL locations are resolved against, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Determines whether a record with the given category passes the filter.
    pub fn is_category_selected(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map_or(true, |selected| selected == category)
    }
}

/// Rendering of the loaded index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of records.
    Json,
    /// One JSON record per line.
    Jsonl,
    /// Human-readable page and section tree.
    Outline,
    /// Summary counts and payload checksum as JSON.
    Manifest,
}

/// Command-line interface for inspecting a search index.
#[derive(Parser, Debug, Clone)]
#[command(name = "docindex", about = "Load, validate and inspect documentation search indexes")]
pub struct Cli {
    /// Search index payload (`search_index.js` or bare JSON); `-` reads stdin
    #[arg(long, env = "DOCINDEX_INPUT", default_value = "search_index.js")]
    pub input: PathBuf,

    /// Output rendering
    #[arg(long, env = "DOCINDEX_FORMAT", value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Only emit records whose category tag matches (e.g. section, page)
    #[arg(long, env = "DOCINDEX_CATEGORY")]
    pub category: Option<String>,

    /// Resolve locations against this site URL (should end in '/')
    #[arg(long, env = "DOCINDEX_BASE_URL")]
    pub base_url: Option<String>,
}

impl Cli {
    /// Converts the parsed CLI into `OutputOptions`.
    pub fn output_options(&self) -> Result<OutputOptions> {
        let base_url = self
            .base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid --base-url {raw:?}")))
            .transpose()?;
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(OutputOptions::new(category, base_url))
    }

    /// True when the payload should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputFormat};
    use clap::Parser;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["docindex"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Jsonl);
        assert!(!cli.reads_stdin());
        let options = cli.output_options().unwrap();
        assert_eq!(options.category(), None);
        assert!(options.is_category_selected("anything"));
    }

    #[test]
    fn parses_filters() {
        let cli = Cli::try_parse_from([
            "docindex",
            "--input",
            "-",
            "--format",
            "outline",
            "--category",
            " section ",
            "--base-url",
            "https://example.org/docs/",
        ])
        .unwrap();
        assert!(cli.reads_stdin());
        assert_eq!(cli.format, OutputFormat::Outline);

        let options = cli.output_options().unwrap();
        assert_eq!(options.category(), Some("section"));
        assert!(options.is_category_selected("section"));
        assert!(!options.is_category_selected("page"));
        assert_eq!(
            options.base_url().map(|url| url.as_str()),
            Some("https://example.org/docs/")
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let cli = Cli::try_parse_from(["docindex", "--base-url", "not a url"]).unwrap();
        assert!(cli.output_options().is_err());
    }
}
