//! Search state machine.
//!
//! SearchState is a sum type with two states:
//! - Inactive: no pattern compiled
//! - Active: a compiled pattern, the direction it was entered with, and
//!   whether matches are highlighted

use crate::classify::compile_search;
use crate::model::PatternError;
use regex::bytes::Regex;

// ===== SearchDirection =====

/// Direction a search runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    /// Toward the end of the text.
    #[default]
    Forward,
    /// Toward the start of the text.
    Backward,
}

impl SearchDirection {
    /// The other direction.
    pub fn reverse(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

// ===== SearchQuery =====

/// Validated search query. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Smart constructor: `None` for an empty query.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let s = raw.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// The query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ===== SearchState =====

/// Search state of a pager session.
/// Sum type enforces exactly one state at a time.
#[derive(Debug, Clone, Default)]
pub enum SearchState {
    /// No search pattern.
    #[default]
    Inactive,
    /// A compiled pattern.
    Active {
        /// Query as typed.
        query: SearchQuery,
        /// Compiled with smart case.
        pattern: Regex,
        /// Direction the query was entered with.
        direction: SearchDirection,
        /// Matches are highlighted.
        highlight: bool,
    },
}

impl SearchState {
    /// Compile `query` into an active, highlighted search.
    ///
    /// # Errors
    ///
    /// Returns the compile failure for an invalid pattern.
    pub fn activate(query: SearchQuery, direction: SearchDirection) -> Result<Self, PatternError> {
        let pattern = compile_search(query.as_str())?;
        Ok(SearchState::Active {
            query,
            pattern,
            direction,
            highlight: true,
        })
    }

    /// True when a pattern is compiled.
    pub fn is_active(&self) -> bool {
        matches!(self, SearchState::Active { .. })
    }

    /// Compiled pattern, if any.
    pub fn pattern(&self) -> Option<&Regex> {
        match self {
            SearchState::Active { pattern, .. } => Some(pattern),
            SearchState::Inactive => None,
        }
    }

    /// Active query, if any.
    pub fn query(&self) -> Option<&SearchQuery> {
        match self {
            SearchState::Active { query, .. } => Some(query),
            SearchState::Inactive => None,
        }
    }

    /// Direction of the active search.
    pub fn direction(&self) -> Option<SearchDirection> {
        match self {
            SearchState::Active { direction, .. } => Some(*direction),
            SearchState::Inactive => None,
        }
    }

    /// True when matches should be drawn highlighted.
    pub fn highlight_visible(&self) -> bool {
        matches!(self, SearchState::Active { highlight: true, .. })
    }

    /// Show or hide match highlighting. No effect when inactive.
    pub fn toggle_highlight(&mut self) {
        if let SearchState::Active { highlight, .. } = self {
            *highlight = !*highlight;
        }
    }

    /// Turn matches highlighting on. No effect when inactive.
    pub fn show_highlight(&mut self) {
        if let SearchState::Active { highlight, .. } = self {
            *highlight = true;
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
