//! Path filters deciding which discovered files are candidates.
//!
//! A [`FilterSet`] is an OR-combination of [`PathFilter`]s. An empty set
//! accepts every path.
use crate::error::Result;
use globset::{Glob, GlobMatcher};
use std::path::Path;

/// One filtering strategy with its own parameters.
#[derive(Debug, Clone)]
pub enum PathFilter {
    /// Accepts paths whose string form ends with the suffix, e.g. `.rs`.
    Suffix(String),
    /// Accepts paths matched by a compiled glob, e.g. `**/src/*.rs`.
    Glob(GlobMatcher),
}

impl PathFilter {
    pub fn suffix(suffix: impl Into<String>) -> Self {
        PathFilter::Suffix(suffix.into())
    }

    pub fn glob(pattern: &str) -> Result<Self> {
        let matcher = Glob::new(pattern)?.compile_matcher();
        Ok(PathFilter::Glob(matcher))
    }

    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            PathFilter::Suffix(suffix) => path.to_string_lossy().ends_with(suffix.as_str()),
            PathFilter::Glob(matcher) => matcher.is_match(path),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<PathFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: PathFilter) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Match-all when empty, otherwise true iff any filter accepts.
    pub fn accepts(&self, path: &Path) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.accepts(path))
    }
}

impl FromIterator<PathFilter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = PathFilter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_set_accepts_everything() {
        let filters = FilterSet::new();
        assert!(filters.accepts(Path::new("a.go")));
        assert!(filters.accepts(Path::new("dir/no_extension")));
    }

    #[test]
    fn test_suffix_filters_are_or_composed() {
        let filters: FilterSet = [PathFilter::suffix(".go"), PathFilter::suffix(".txt")]
            .into_iter()
            .collect();

        assert!(filters.accepts(Path::new("a.go")));
        assert!(filters.accepts(Path::new("b.txt")));
        assert!(!filters.accepts(Path::new("c.md")));
    }

    #[test]
    fn test_suffix_is_not_limited_to_extensions() {
        let filter = PathFilter::suffix("_test.go");
        assert!(filter.accepts(Path::new("pkg/walker_test.go")));
        assert!(!filter.accepts(Path::new("pkg/walker.go")));
    }

    #[test]
    fn test_glob_filter() {
        let filter = PathFilter::glob("**/src/*.rs").unwrap();
        assert!(filter.accepts(Path::new("project/src/lib.rs")));
        assert!(!filter.accepts(Path::new("project/tests/lib.rs")));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        assert!(PathFilter::glob("a[").is_err());
    }

    #[test]
    fn test_glob_and_suffix_mix() {
        let filters: FilterSet = [
            PathFilter::suffix(".md"),
            PathFilter::glob("**/*.toml").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(filters.len(), 2);
        assert!(filters.accepts(Path::new("docs/readme.md")));
        assert!(filters.accepts(Path::new("crate/Cargo.toml")));
        assert!(!filters.accepts(Path::new("crate/src/main.rs")));
    }

    proptest! {
        #[test]
        fn prop_accepts_iff_any_suffix_matches(
            suffixes in proptest::collection::vec("\\.[a-z]{1,3}", 1..4),
            stem in "[a-z]{1,8}",
            ext in "\\.[a-z]{1,3}",
        ) {
            let path = format!("{stem}{ext}");
            let filters: FilterSet = suffixes.iter().map(PathFilter::suffix).collect();
            let expected = suffixes.iter().any(|s| path.ends_with(s.as_str()));
            prop_assert_eq!(filters.accepts(Path::new(&path)), expected);
        }
    }
}
