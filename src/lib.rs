//! Regex-driven bulk rewriting of files.
//!
//! A run resolves its starting paths, discovers files under directories with a
//! bounded breadth-first walk, filters them, and then for each file that
//! matches the pattern either rewrites it, prints a diff, or prints the
//! replaced text. Everything is sequential and the first error ends the run.
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod pipeline;
pub mod processor;
pub mod request;
pub mod walker;

pub use crate::error::{Result, RfsubError};
pub use cli::Cli;
pub use config::{ColorChoice, Config};
pub use diff::{DiffRenderer, DiffStyle};
pub use filter::{FilterSet, PathFilter};
pub use pattern::PatternEngine;
pub use pipeline::{RunSummary, TransformPipeline};
pub use processor::{FileCandidate, TransformResult};
pub use request::{OutputMode, SearchRequest, SearchRequestBuilder};
pub use walker::{DirectoryWalker, DEFAULT_MAX_DEPTH};

use std::io::Write;

/// Runs `request`, sending print and diff output to `out`.
pub fn run<W: Write>(
    request: &SearchRequest,
    renderer: DiffRenderer,
    out: W,
) -> Result<RunSummary> {
    TransformPipeline::new(request, renderer, out).run()
}

/// Merges command-line arguments over file configuration.
pub fn build_request(cli: &Cli, config: &Config) -> Result<SearchRequest> {
    SearchRequest::builder(cli.match_pattern.as_str(), cli.replace_pattern.as_str())
        .paths(&cli.paths)
        .recursive(cli.recursive)
        .filetypes(config.filter.filetypes.iter().chain(&cli.filetypes).cloned())
        .globs(config.filter.globs.iter().chain(&cli.globs).cloned())
        .output_mode(cli.output_mode())
        .max_depth(cli.max_depth.unwrap_or(config.walk.max_depth))
        .skip_binary(cli.skip_binary || config.filter.skip_binary)
        .build()
}

/// Picks the diff style for a colour preference and whether stdout is a tty.
pub fn diff_style(choice: ColorChoice, is_terminal: bool) -> DiffStyle {
    match choice {
        ColorChoice::Always => DiffStyle::Ansi,
        ColorChoice::Never => DiffStyle::Plain,
        ColorChoice::Auto if is_terminal => DiffStyle::Ansi,
        ColorChoice::Auto => DiffStyle::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_extends_config_filters() {
        let cli = Cli::try_parse_from([
            "rfsub", "-m", "a", "-r", "b", "--filetype", ".txt", "--max-depth", "9", "x",
        ])
        .unwrap();
        let mut config = Config::default();
        config.filter.filetypes = vec![".md".to_string()];
        config.walk.max_depth = 50;

        let request = build_request(&cli, &config).unwrap();
        assert_eq!(request.filters().len(), 2);
        assert_eq!(request.max_depth(), 9);
    }

    #[test]
    fn test_config_depth_used_without_flag() {
        let cli = Cli::try_parse_from(["rfsub", "-m", "a", "-r", "b", "x"]).unwrap();
        let mut config = Config::default();
        config.walk.max_depth = 50;
        config.filter.skip_binary = true;

        let request = build_request(&cli, &config).unwrap();
        assert_eq!(request.max_depth(), 50);
        assert!(request.skip_binary());
    }

    #[test]
    fn test_diff_style_selection() {
        assert_eq!(diff_style(ColorChoice::Always, false), DiffStyle::Ansi);
        assert_eq!(diff_style(ColorChoice::Never, true), DiffStyle::Plain);
        assert_eq!(diff_style(ColorChoice::Auto, true), DiffStyle::Ansi);
        assert_eq!(diff_style(ColorChoice::Auto, false), DiffStyle::Plain);
    }
}
