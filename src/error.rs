use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfsubError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("{which} pattern must not be empty")]
    EmptyPattern { which: &'static str },

    #[error("Cannot search directory '{}' without --recursive", path.display())]
    DirectoryWithoutRecursion { path: PathBuf },

    #[error("Failed to stat '{}': {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid glob: {0}")]
    InvalidGlob(#[from] globset::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed reading directory contents of '{}': {source}", path.display())]
    DirectoryList {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Reached maximum recursion depth ({depth})")]
    RecursionLimit { depth: usize },

    #[error("Invalid replacement template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Failed to process file '{}': {source}", path.display())]
    FileProcessing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {}", path.display())]
    NotUtf8 { path: PathBuf },
}

impl RfsubError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RfsubError::FileProcessing {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RfsubError>;
