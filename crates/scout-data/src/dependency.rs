//! Dependency tagging for outbound calls.

use std::time::Duration;

/// The kinds of calls the storefront makes against the search endpoint.
///
/// Each tag carries a default timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Faceted search used by the results page.
    Search,
    /// Autosuggest while the user types.
    Suggestions,
    /// Unfiltered catalog snapshot fetched on mount.
    Catalog,
}

impl DependencyTag {
    /// Get the default timeout for this dependency type.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Search => Duration::from_secs(5),
            Self::Suggestions => Duration::from_secs(3),
            Self::Catalog => Duration::from_secs(10),
        }
    }

    /// Get the default max retries for this dependency type.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Search | Self::Catalog => 1,
            // Best-effort; the next keystroke retries anyway.
            Self::Suggestions => 0,
        }
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Suggestions => "suggestions",
            Self::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
