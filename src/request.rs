use crate::error::{Result, RfsubError};
use crate::filter::{FilterSet, PathFilter};
use crate::walker::DEFAULT_MAX_DEPTH;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Rewrite matching files on disk.
    Write,
    /// Print a diff per transformed file.
    Diff,
    /// Print the replaced text per transformed file.
    #[default]
    Print,
}

/// Immutable description of one run.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    match_pattern: String,
    replace_pattern: String,
    paths: Vec<PathBuf>,
    recursive: bool,
    filters: FilterSet,
    output_mode: OutputMode,
    max_depth: usize,
    skip_binary: bool,
}

/// Starting paths split by kind. Files bypass traversal entirely.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Targets {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

impl SearchRequest {
    pub fn builder(
        match_pattern: impl Into<String>,
        replace_pattern: impl Into<String>,
    ) -> SearchRequestBuilder {
        SearchRequestBuilder::new(match_pattern, replace_pattern)
    }

    pub fn match_pattern(&self) -> &str {
        &self.match_pattern
    }

    pub fn replace_pattern(&self) -> &str {
        &self.replace_pattern
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn skip_binary(&self) -> bool {
        self.skip_binary
    }

    /// Stats every starting path and splits them into files and directories.
    ///
    /// A directory without the recursion flag aborts here, before any file is
    /// opened.
    pub fn resolve_targets(&self) -> Result<Targets> {
        let mut targets = Targets::default();
        for path in &self.paths {
            let metadata = fs::metadata(path).map_err(|source| RfsubError::Stat {
                path: path.clone(),
                source,
            })?;

            if metadata.is_dir() {
                if !self.recursive {
                    return Err(RfsubError::DirectoryWithoutRecursion { path: path.clone() });
                }
                debug!("search directory: {}", path.display());
                targets.directories.push(path.clone());
            } else {
                debug!("search file: {}", path.display());
                targets.files.push(path.clone());
            }
        }
        Ok(targets)
    }
}

pub struct SearchRequestBuilder {
    match_pattern: String,
    replace_pattern: String,
    paths: Vec<PathBuf>,
    recursive: bool,
    filetypes: Vec<String>,
    globs: Vec<String>,
    output_mode: OutputMode,
    max_depth: usize,
    skip_binary: bool,
}

impl SearchRequestBuilder {
    pub fn new(match_pattern: impl Into<String>, replace_pattern: impl Into<String>) -> Self {
        Self {
            match_pattern: match_pattern.into(),
            replace_pattern: replace_pattern.into(),
            paths: Vec::new(),
            recursive: false,
            filetypes: Vec::new(),
            globs: Vec::new(),
            output_mode: OutputMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            skip_binary: false,
        }
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn filetypes<I, S>(mut self, filetypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filetypes.extend(filetypes.into_iter().map(Into::into));
        self
    }

    pub fn globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn skip_binary(mut self, skip_binary: bool) -> Self {
        self.skip_binary = skip_binary;
        self
    }

    pub fn build(self) -> Result<SearchRequest> {
        if self.match_pattern.is_empty() {
            return Err(RfsubError::EmptyPattern { which: "match" });
        }
        if self.replace_pattern.is_empty() {
            return Err(RfsubError::EmptyPattern { which: "replace" });
        }

        let mut filters = FilterSet::new();
        for suffix in self.filetypes {
            filters.push(PathFilter::suffix(suffix));
        }
        for glob in &self.globs {
            filters.push(PathFilter::glob(glob)?);
        }

        Ok(SearchRequest {
            match_pattern: self.match_pattern,
            replace_pattern: self.replace_pattern,
            paths: self.paths,
            recursive: self.recursive,
            filters,
            output_mode: self.output_mode,
            max_depth: self.max_depth,
            skip_binary: self.skip_binary,
        })
    }
}
