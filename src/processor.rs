use crate::error::{Result, RfsubError};
use crate::pattern::PatternEngine;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const BINARY_CHECK_SIZE: usize = 8000;

/// A discovered path plus the permissions it had when it was stat'ed.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub permissions: Permissions,
}

impl FileCandidate {
    pub fn stat(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| RfsubError::file(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            permissions: metadata.permissions(),
        })
    }

    /// Opens the file read-write, the same access the rewrite will need.
    pub fn open(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| RfsubError::file(&self.path, e))
    }

    /// Truncates the file, writes `content` and restores the permissions
    /// captured by [`FileCandidate::stat`].
    pub fn rewrite(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| RfsubError::file(&self.path, e))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.set_permissions(self.permissions.clone()))
            .map_err(|e| RfsubError::file(&self.path, e))
    }
}

/// What a single file turned into. `replaced` is empty when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub original: String,
    pub replaced: String,
    pub matched: bool,
}

impl TransformResult {
    pub fn apply(engine: &PatternEngine, original: String) -> Self {
        if !engine.is_match(&original) {
            return Self {
                original,
                replaced: String::new(),
                matched: false,
            };
        }
        let replaced = engine.replace(&original);
        Self {
            original,
            replaced,
            matched: true,
        }
    }
}

/// Reads the whole file as text.
///
/// With `skip_binary`, binary-looking or non-UTF-8 content yields `None`;
/// without it, non-UTF-8 content is fatal.
pub fn read_text(file: &mut File, path: &Path, skip_binary: bool) -> Result<Option<String>> {
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)
        .map_err(|e| RfsubError::file(path, e))?;

    if skip_binary && looks_binary(&raw) {
        return Ok(None);
    }

    match String::from_utf8(raw) {
        Ok(text) => Ok(Some(text)),
        Err(_) if skip_binary => Ok(None),
        Err(_) => Err(RfsubError::NotUtf8 {
            path: path.to_path_buf(),
        }),
    }
}

/// More than 30% NUL bytes in the leading block.
pub fn looks_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(BINARY_CHECK_SIZE)];
    if head.is_empty() {
        return false;
    }
    let null_bytes = head.iter().filter(|&&b| b == 0).count();
    (null_bytes as f64 / head.len() as f64) > 0.3
}
