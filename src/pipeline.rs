//! Sequential orchestration: resolve targets, discover, filter, transform.
use crate::diff::DiffRenderer;
use crate::error::Result;
use crate::pattern::PatternEngine;
use crate::processor::{read_text, FileCandidate, TransformResult};
use crate::request::{OutputMode, SearchRequest, Targets};
use crate::walker::DirectoryWalker;
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Transformed,
    NoMatch,
    SkippedBinary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: usize,
    pub transformed: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Transformed => self.transformed += 1,
            Outcome::NoMatch => self.unmatched += 1,
            Outcome::SkippedBinary => self.skipped += 1,
        }
    }
}

/// Runs one [`SearchRequest`] to completion, writing print and diff output
/// to `out`. The first error of any kind ends the run; files already
/// rewritten stay rewritten.
pub struct TransformPipeline<'a, W: Write> {
    request: &'a SearchRequest,
    renderer: DiffRenderer,
    out: W,
}

impl<'a, W: Write> TransformPipeline<'a, W> {
    pub fn new(request: &'a SearchRequest, renderer: DiffRenderer, out: W) -> Self {
        Self {
            request,
            renderer,
            out,
        }
    }

    pub fn run(mut self) -> Result<RunSummary> {
        let targets = self.request.resolve_targets()?;
        let engine = PatternEngine::new(
            self.request.match_pattern(),
            self.request.replace_pattern(),
        )?;
        debug!("compiled pattern {:?}", engine.as_str());
        let candidates = self.collect_candidates(targets)?;

        let mut summary = RunSummary {
            candidates: candidates.len(),
            ..RunSummary::default()
        };
        for candidate in &candidates {
            let outcome = self.process(&engine, candidate)?;
            summary.record(outcome);
        }
        self.out.flush()?;

        info!(
            "{} candidate(s): {} transformed, {} without match, {} skipped",
            summary.candidates, summary.transformed, summary.unmatched, summary.skipped
        );
        Ok(summary)
    }

    /// Explicit files first, then everything discovered under the directories,
    /// all passed through the same filter set. Nothing has been opened yet when
    /// this returns.
    pub fn collect_candidates(&self, targets: Targets) -> Result<Vec<FileCandidate>> {
        let mut paths: Vec<PathBuf> = targets.files;
        if self.request.recursive() {
            let walker = DirectoryWalker::new(self.request.max_depth());
            paths.extend(walker.walk(&targets.directories)?);
        }

        let filters = self.request.filters();
        paths
            .iter()
            .filter(|path| {
                let accepted = filters.accepts(path);
                if !accepted {
                    debug!("filtered out: {}", path.display());
                }
                accepted
            })
            .map(|path| FileCandidate::stat(path))
            .collect()
    }

    /// Handles one file. The read handle is dropped on every exit path before
    /// the next file is touched.
    pub fn process(
        &mut self,
        engine: &PatternEngine,
        candidate: &FileCandidate,
    ) -> Result<Outcome> {
        let path = candidate.path.as_path();
        let original = {
            let mut file = candidate.open()?;
            match read_text(&mut file, path, self.request.skip_binary())? {
                Some(text) => text,
                None => {
                    warn!("Skipping binary file: {}", path.display());
                    return Ok(Outcome::SkippedBinary);
                }
            }
        };

        let result = TransformResult::apply(engine, original);
        if !result.matched {
            debug!("no pattern match: {}", path.display());
            return Ok(Outcome::NoMatch);
        }

        match self.request.output_mode() {
            OutputMode::Write => {
                debug!("rewriting {}", path.display());
                candidate.rewrite(&result.replaced)?;
            }
            OutputMode::Diff => {
                let diff = self.renderer.render(&result.original, &result.replaced);
                self.out.write_all(diff.as_bytes())?;
            }
            OutputMode::Print => {
                self.out.write_all(result.replaced.as_bytes())?;
            }
        }
        Ok(Outcome::Transformed)
    }
}
