use crate::config::ColorChoice;
use crate::request::OutputMode;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(group(ArgGroup::new("output").args(["write", "diff"]).multiple(false)))]
pub struct Cli {
    /// Files or directories to transform
    #[clap(required = true, value_parser)]
    pub paths: Vec<PathBuf>,

    /// Regex matched against whole file contents
    #[clap(short = 'm', long = "match", value_parser)]
    pub match_pattern: String,

    /// Replacement template; $1, ${name} and $$ are expanded
    #[clap(short = 'r', long = "replace", value_parser)]
    pub replace_pattern: String,

    /// Descend into directory paths
    #[clap(short = 'R', long, value_parser, default_value_t = false)]
    pub recursive: bool,

    /// Only transform paths ending with this suffix (repeatable)
    #[clap(long = "filetype", value_parser)]
    pub filetypes: Vec<String>,

    /// Only transform paths matching this glob (repeatable)
    #[clap(long = "glob", value_parser)]
    pub globs: Vec<String>,

    /// Rewrite matching files in place
    #[clap(short, long, value_parser, default_value_t = false)]
    pub write: bool,

    /// Print a diff for every matching file instead of the replaced text
    #[clap(short, long, value_parser, default_value_t = false)]
    pub diff: bool,

    /// Maximum number of directory levels to descend
    #[clap(long, value_parser)]
    pub max_depth: Option<usize>,

    /// Skip binary and non-UTF-8 files instead of failing
    #[clap(long, value_parser, default_value_t = false)]
    pub skip_binary: bool,

    /// When to colour diff output
    #[clap(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Read configuration from this file instead of the default locations
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long, value_parser, default_value_t = false)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.write {
            OutputMode::Write
        } else if self.diff {
            OutputMode::Diff
        } else {
            OutputMode::Print
        }
    }
}
