//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile a configured list of regular expressions once
//! - Answer whether a request path belongs to the list
//!
//! # Design Decisions
//! - Search semantics: a pattern may match anywhere in the path
//! - No implicit anchoring or case folding; patterns carry their own
//! - First matching pattern wins; order only affects cost

use regex::Regex;
use thiserror::Error;

/// A configured pattern that failed to compile.
#[derive(Debug, Error)]
#[error("invalid path pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// An ordered, pre-compiled set of path patterns.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<Regex>,
}

impl PathMatcher {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| PatternError {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if at least one pattern matches somewhere in `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
