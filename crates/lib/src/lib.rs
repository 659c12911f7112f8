//!
//! Paramsync: keep application state in the URL query string.
//! This library provides the components that let many consumers read and write named query
//! params declaratively, and re-render only when the params they depend on change.
//!
//! ## Core Concepts
//!
//! Paramsync is built around several key concepts:
//!
//! * **Filters (`filter::Filter`)**: How one named param is parsed, formatted, validated and defaulted. Built once with `Filter::builder` and shared.
//! * **Compositions (`filter::FilterComposition`)**: Several filters read and written as one value under a joint validator, such as a `min`/`max` range.
//! * **Location Observer (`observer::LocationObserver`)**: The canonical snapshot of the current query string, with per-param change subscriptions.
//! * **Filter Registry (`registry::FilterRegistry`)**: Reference counts the filters bound in a scope and detects conflicting configurations for the same param.
//! * **Bindings (`binding::FilterBinding`)**: One consumer's live value of a filter or composition, plus the setter that writes it back.
//! * **History (`history::History`)**: The navigation source the query string lives in. Writes are committed with `apply_history_action`.
//! * **Providers (`provider::FiltersProvider`)**: One scope tying a history to an observer and a registry. Bindings and resets go through a provider.

pub mod binding;
pub mod constants;
pub mod filter;
pub mod history;
pub mod observer;
pub mod params;
pub mod provider;
pub mod registry;

pub use binding::{FilterBinding, FilterSetter, FilterValue, NextValue};
pub use filter::{CompositeValue, Filter, FilterArg, FilterBuilder, FilterComposition, FilterDefinition, FilterId};
#[cfg(any(test, feature = "testing"))]
pub use history::MemoryHistory;
pub use history::{History, HistoryAction, Location, SetFilterOptions, apply_history_action};
pub use observer::{LocationObserver, ParamInfo, WatchHandle};
pub use params::QueryParams;
pub use provider::{FiltersProvider, ProviderConfig, ResetTarget};
pub use registry::FilterRegistry;

/// Result type used throughout the Paramsync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Paramsync library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured filter errors from the filter module
    #[error(transparent)]
    Filter(filter::FilterError),

    /// Structured registry errors from the registry module
    #[error(transparent)]
    Registry(registry::RegistryError),

    /// Structured provider errors from the provider module
    #[error(transparent)]
    Provider(provider::ProviderError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Filter(_) => "filter",
            Error::Registry(_) => "registry",
            Error::Provider(_) => "provider",
        }
    }

    /// Check if this error rejected an argument or a missing collaborator.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Filter(filter_err) => filter_err.is_invalid_argument(),
            Error::Provider(provider_err) => provider_err.is_missing_history(),
            _ => false,
        }
    }

    /// Check if this error is a filter configuration collision.
    pub fn is_collision(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_collision(),
            _ => false,
        }
    }

    /// Check if this error comes from a formatter that produced no string.
    pub fn is_formatter_violation(&self) -> bool {
        match self {
            Error::Filter(filter_err) => filter_err.is_formatter_violation(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Provider(provider_err) => provider_err.is_invalid_config(),
            _ => false,
        }
    }

    /// The param the error is about, when there is one.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Error::Filter(filter_err) => filter_err.param_name(),
            Error::Registry(registry_err) => Some(registry_err.param_name()),
            Error::Provider(_) => None,
        }
    }
}
