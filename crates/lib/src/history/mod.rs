//! Navigation source abstraction.
//!
//! This module provides the [`History`] trait that the provider listens to and
//! writes through, together with the options every write accepts and the
//! [`apply_history_action`] function that commits a set of params.
//!
//! Production code plugs in whatever navigation source the host application
//! uses. Tests use [`MemoryHistory`], which keeps a stack of locations in
//! memory.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod apply;
#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use apply::apply_history_action;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryHistory;

/// A location as seen by the navigation source.
///
/// `search` carries the leading `?` when non-empty, and is empty otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    /// Create a location from a path and a search string.
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }
}

/// Callback invoked after every navigation.
pub type LocationListener = Arc<dyn Fn(&Location) + Send + Sync>;

/// Stops a listener registered with [`History::listen`].
pub type Unlisten = Box<dyn FnOnce() + Send + Sync>;

/// A push-based navigation source.
///
/// Implementations must invoke listeners after the new location is current,
/// and must not hold internal locks while doing so: listeners read the
/// location and may navigate again.
pub trait History: Send + Sync + fmt::Debug {
    /// The current location.
    fn location(&self) -> Location;

    /// Navigate to a new entry with the given query string.
    fn push(&self, search: &str);

    /// Replace the current entry's query string.
    fn replace(&self, search: &str);

    /// Register a listener for location changes.
    fn listen(&self, listener: LocationListener) -> Unlisten;
}

/// How a write is committed to the navigation source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    /// Add a new history entry.
    #[default]
    Push,
    /// Overwrite the current history entry.
    Replace,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryAction::Push => f.write_str("PUSH"),
            HistoryAction::Replace => f.write_str("REPLACE"),
        }
    }
}

/// Options accepted by setters and resets.
///
/// ```
/// use paramsync::{HistoryAction, SetFilterOptions};
///
/// let options = SetFilterOptions::default().replace().incrementally();
/// assert_eq!(options.action, Some(HistoryAction::Replace));
/// assert!(options.incrementally);
/// assert!(!options.dry);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetFilterOptions {
    /// Compute the resulting query string without committing it
    pub dry: bool,
    /// History action to commit with; `None` uses the provider's default
    pub action: Option<HistoryAction>,
    /// Leave composition members missing from the update untouched
    pub incrementally: bool,
}

impl SetFilterOptions {
    /// Options for a dry run.
    pub fn dry_run() -> Self {
        Self {
            dry: true,
            ..Self::default()
        }
    }

    /// Compute the query string without touching history.
    pub fn dry(mut self) -> Self {
        self.dry = true;
        self
    }

    /// Add a new history entry.
    pub fn push(mut self) -> Self {
        self.action = Some(HistoryAction::Push);
        self
    }

    /// Overwrite the current history entry.
    pub fn replace(mut self) -> Self {
        self.action = Some(HistoryAction::Replace);
        self
    }

    pub fn incrementally(mut self) -> Self {
        self.incrementally = true;
        self
    }

    /// Fill in the action if the caller left it open.
    pub fn or_action(mut self, default_action: HistoryAction) -> Self {
        self.action.get_or_insert(default_action);
        self
    }
}
