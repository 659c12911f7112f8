//! Provider configuration.

use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::Result;
use crate::history::HistoryAction;

/// Settings for a [`FiltersProvider`](super::FiltersProvider).
///
/// ```
/// use paramsync::{HistoryAction, ProviderConfig};
///
/// let config = ProviderConfig::from_json(r#"{ "default_action": "REPLACE" }"#).unwrap();
/// assert_eq!(config.default_action, HistoryAction::Replace);
/// assert_eq!(config.initial_search, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Action used by writes that do not pick one
    pub default_action: HistoryAction,
    /// Query string the history's current entry is replaced with when the
    /// provider is created
    pub initial_search: Option<String>,
}

impl ProviderConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| {
            ProviderError::InvalidConfig {
                reason: err.to_string(),
            }
            .into()
        })
    }

    /// Set the action used by writes that do not pick one.
    pub fn with_default_action(mut self, action: HistoryAction) -> Self {
        self.default_action = action;
        self
    }

    /// Set the query string applied to the history at creation.
    pub fn with_initial_search(mut self, search: impl Into<String>) -> Self {
        self.initial_search = Some(search.into());
        self
    }
}
