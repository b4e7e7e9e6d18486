use crate::error::{Result, RfsubError};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Breadth-first directory discovery with a hard depth ceiling.
///
/// Every round lists the immediate contents of the current frontier. Files are
/// collected and subdirectories become the next frontier. Running into the
/// ceiling while directories are still unexpanded is an error, never a silent
/// truncation.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryWalker {
    max_depth: usize,
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

struct TraversalState {
    depth: usize,
    frontier: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl DirectoryWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns every non-directory entry reachable from `directories`.
    ///
    /// Shallower files come before deeper ones; within a level the order is
    /// whatever the directory listing produced. Nothing is returned on error.
    pub fn walk<P: AsRef<Path>>(&self, directories: &[P]) -> Result<Vec<PathBuf>> {
        let mut state = TraversalState {
            depth: 0,
            frontier: directories.iter().map(|d| d.as_ref().to_path_buf()).collect(),
            files: Vec::new(),
        };

        while !state.frontier.is_empty() {
            if state.depth >= self.max_depth {
                debug!("hit recursion limit at depth {}", state.depth);
                return Err(RfsubError::RecursionLimit {
                    depth: state.depth,
                });
            }

            let mut next = Vec::new();
            for directory in &state.frontier {
                list_directory(directory, state.depth, &mut state.files, &mut next)?;
            }

            state.frontier = next;
            state.depth += 1;
        }

        Ok(state.files)
    }
}

fn list_directory(
    directory: &Path,
    depth: usize,
    files: &mut Vec<PathBuf>,
    subdirs: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in WalkDir::new(directory).max_depth(1) {
        let entry = entry.map_err(|source| RfsubError::DirectoryList {
            path: directory.to_path_buf(),
            source,
        })?;

        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(RfsubError::NotADirectory {
                    path: directory.to_path_buf(),
                });
            }
            continue;
        }

        // Symlinks are not followed; a link to a directory is reported as a file.
        let is_dir = entry.file_type().is_dir();
        let path = entry.into_path();
        if is_dir {
            debug!("found new directory at depth {depth}: {}", path.display());
            subdirs.push(path);
        } else {
            debug!("found new file at depth {depth}: {}", path.display());
            files.push(path);
        }
    }
    Ok(())
}
