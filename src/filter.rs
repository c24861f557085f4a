//! Basename blacklist filtering for change events.
//!
//! Editors produce a steady drizzle of files nobody wants a build triggered
//! by: swap files, atomic-save probes, backups. The filter tests the final
//! path segment of every change against an ordered set of anchored regular
//! expressions and drops matches before they reach the debounce buffer.

use std::path::Path;

use regex::Regex;
use thiserror::Error;

/// Environment variable holding additional colon-separated blacklist
/// patterns, unioned with [`DEFAULT_BLACKLIST`].
pub const BLACKLIST_ENV: &str = "RERUN_BLACKLIST";

/// Built-in basename blacklist: vim's atomic-save probe file, dotfiles,
/// editor swap files, backup files.
const DEFAULT_BLACKLIST: &str = "
4913
\\..*
.*\\.sw[px]
.*~
";

/// A blacklist pattern that failed to compile. Fatal at startup.
#[derive(Debug, Error)]
#[error("invalid blacklist pattern '{pattern}': {source}")]
pub struct FilterError {
    pattern: String,
    #[source]
    source: regex::Error,
}

/// An ordered set of compiled patterns, each anchored to match a whole
/// basename. Immutable once constructed; matching is pure.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<Regex>,
}

impl PathFilter {
    /// An empty filter. Matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in blacklist unioned with patterns from `RERUN_BLACKLIST`.
    pub fn from_env() -> Result<Self, FilterError> {
        let mut filter = Self::new();
        filter.add_patterns(DEFAULT_BLACKLIST, '\n')?;
        filter.add_patterns(&std::env::var(BLACKLIST_ENV).unwrap_or_default(), ':')?;
        Ok(filter)
    }

    /// Compile each `separator`-delimited pattern in `list` and append it.
    ///
    /// Patterns are anchored (`^...$`): they match whole basenames, never
    /// substrings. Empty segments are skipped. The first pattern that fails
    /// to compile aborts construction.
    pub fn add_patterns(&mut self, list: &str, separator: char) -> Result<(), FilterError> {
        for pattern in list.split(separator).filter(|p| !p.is_empty()) {
            let re = Regex::new(&format!("^{pattern}$")).map_err(|source| FilterError {
                pattern: pattern.to_string(),
                source,
            })?;
            self.patterns.push(re);
        }
        Ok(())
    }

    /// Whether the final segment of `path` matches any pattern.
    ///
    /// Directory components are stripped before matching. A path without a
    /// final segment matches nothing.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|re| re.is_match(name))
    }
}
