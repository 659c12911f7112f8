//! Filters provider.
//!
//! A [`FiltersProvider`] is one scope of filter state: a [`LocationObserver`]
//! fed by a [`History`], a [`FilterRegistry`] of the filters bound in the
//! scope, and the configuration writes use. Consumers bind filters through the
//! provider and reset them through it.
//!
//! Providers are independent. Two providers over the same history each keep
//! their own registry, so binding differently configured filters to the same
//! param in different providers is not a collision.
//!
//! ```
//! use paramsync::{FiltersProvider, History, MemoryHistory, NextValue, SetFilterOptions};
//!
//! let history = MemoryHistory::new();
//! let provider = FiltersProvider::new(history.clone());
//!
//! let page = provider.bind::<u32, _, _>("page", || {}).unwrap();
//! page.set(NextValue::Value(2), SetFilterOptions::default()).unwrap();
//!
//! assert_eq!(history.location().search, "?page=2");
//! assert_eq!(page.value().into_single(), Some(2));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use handle_trait::Handle;

use crate::Result;
use crate::binding::FilterBinding;
use crate::filter::{FilterArg, FilterComposition, FilterDefinition};
use crate::history::{History, Location, SetFilterOptions, Unlisten, apply_history_action};
use crate::observer::LocationObserver;
use crate::registry::FilterRegistry;
use crate::{Filter, QueryParams};

pub mod config;
pub mod errors;

pub use config::ProviderConfig;
pub use errors::ProviderError;

struct ProviderInner {
    history: Arc<dyn History>,
    observer: LocationObserver,
    registry: FilterRegistry,
    config: ProviderConfig,
    unlisten: Mutex<Option<Unlisten>>,
}

impl ProviderInner {
    fn close(&self) {
        let unlisten = self
            .unlisten
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(unlisten) = unlisten {
            unlisten();
            tracing::debug!("Provider stopped listening to history");
        }
    }
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        self.close();
    }
}

/// One scope of filter state wired to a navigation source.
///
/// `FiltersProvider` is a cheap-to-clone handle; clones share the observer,
/// the registry and the history subscription. The subscription ends when
/// [`FiltersProvider::close`] is called or the last handle is dropped.
#[derive(Clone, Handle)]
pub struct FiltersProvider {
    inner: Arc<ProviderInner>,
}

impl FiltersProvider {
    /// Create a provider with the default configuration.
    pub fn new<H: History + 'static>(history: H) -> Self {
        Self::from_parts(Arc::new(history), ProviderConfig::default())
    }

    /// Create a provider with a configuration.
    pub fn with_config<H: History + 'static>(history: H, config: ProviderConfig) -> Self {
        Self::from_parts(Arc::new(history), config)
    }

    /// Start building a provider.
    pub fn builder() -> FiltersProviderBuilder {
        FiltersProviderBuilder::default()
    }

    fn from_parts(history: Arc<dyn History>, config: ProviderConfig) -> Self {
        if let Some(search) = &config.initial_search {
            history.replace(search);
        }
        let initial_search = history.location().search;
        let observer = LocationObserver::new(&initial_search);

        let listening = observer.clone();
        let unlisten = history.listen(Arc::new(move |location: &Location| {
            listening.notify(&location.search);
        }));

        tracing::debug!(search = %initial_search, action = %config.default_action, "Created filters provider");

        Self {
            inner: Arc::new(ProviderInner {
                history,
                observer,
                registry: FilterRegistry::new(),
                config,
                unlisten: Mutex::new(Some(unlisten)),
            }),
        }
    }

    /// Bind a param name, filter or composition.
    ///
    /// The re-render trigger runs after every change to one of the bound
    /// params, once the binding's value is up to date.
    ///
    /// Fails with an invalid-argument error for [`FilterArg::Invalid`] or an
    /// empty param name, and with a configuration collision when a different
    /// filter is already active for one of the params in this provider.
    pub fn bind<T, A, F>(&self, arg: A, rerender: F) -> Result<FilterBinding<T>>
    where
        T: Clone + Send + Sync + 'static,
        A: Into<FilterArg<T>>,
        F: Fn() + Send + Sync + 'static,
    {
        FilterBinding::activate(self, arg.into(), rerender)
    }

    /// Restore every filter bound in this provider to its reset value.
    ///
    /// Params without a bound filter are left alone.
    pub fn reset(&self, options: SetFilterOptions) -> Result<String> {
        self.reset_definitions(self.inner.registry.all_filters(), options)
    }

    /// Restore the given filter or composition to its reset value.
    pub fn reset_filters(&self, target: impl Into<ResetTarget>, options: SetFilterOptions) -> Result<String> {
        self.reset_definitions(target.into().filters, options)
    }

    fn reset_definitions(
        &self,
        filters: Vec<Arc<dyn FilterDefinition>>,
        options: SetFilterOptions,
    ) -> Result<String> {
        let mut writes = Vec::with_capacity(filters.len());
        for filter in &filters {
            writes.push((filter.param_name(), filter.reset_param()?));
        }

        let mut params = self.current_params();
        for (param_name, raw) in writes {
            match raw {
                Some(raw) => params.set(param_name, raw),
                None => params.delete(param_name),
            }
        }

        tracing::debug!(filters = filters.len(), "Resetting filters");
        Ok(self.commit(params, options))
    }

    /// Params writes start from. The observer's snapshot while listening,
    /// the history's own location once closed.
    pub(crate) fn current_params(&self) -> QueryParams {
        if self.is_listening() {
            self.inner.observer.current_params()
        } else {
            QueryParams::parse(&self.inner.history.location().search)
        }
    }

    /// Commit params through the applier, using the configured default action
    /// when the options leave it open.
    pub(crate) fn commit(&self, params: QueryParams, options: SetFilterOptions) -> String {
        apply_history_action(
            self.inner.history.as_ref(),
            params,
            options.or_action(self.inner.config.default_action),
        )
    }

    /// The observer tracking this provider's query string.
    pub fn observer(&self) -> &LocationObserver {
        &self.inner.observer
    }

    /// Filters bound in this provider.
    pub fn registry(&self) -> &FilterRegistry {
        &self.inner.registry
    }

    /// The navigation source.
    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    /// Configuration used by writes.
    pub fn config(&self) -> &ProviderConfig {
        &self.inner.config
    }

    /// Stop listening to history. Bindings keep their last values, while
    /// writes start from the history's current location.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Whether the provider still follows history changes.
    pub fn is_listening(&self) -> bool {
        self.inner
            .unlisten
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for FiltersProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiltersProvider")
            .field("observer", &self.inner.observer)
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FiltersProvider`].
#[derive(Default)]
pub struct FiltersProviderBuilder {
    history: Option<Arc<dyn History>>,
    config: ProviderConfig,
}

impl FiltersProviderBuilder {
    /// Use `history` as the navigation source.
    pub fn history<H: History + 'static>(mut self, history: H) -> Self {
        self.history = Some(Arc::new(history));
        self
    }

    /// Use a history that is already shared.
    pub fn shared_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the provider. Fails with [`ProviderError::MissingHistory`] when no
    /// history was given.
    pub fn build(self) -> Result<FiltersProvider> {
        let Some(history) = self.history else {
            tracing::warn!("Rejected provider without a history");
            return Err(ProviderError::MissingHistory.into());
        };
        Ok(FiltersProvider::from_parts(history, self.config))
    }
}

/// Filters targeted by [`FiltersProvider::reset_filters`].
#[derive(Debug, Clone)]
pub struct ResetTarget {
    filters: Vec<Arc<dyn FilterDefinition>>,
}

impl ResetTarget {
    /// Params the reset will write.
    pub fn param_names(&self) -> Vec<&str> {
        self.filters.iter().map(|filter| filter.param_name()).collect()
    }
}

impl<T: Send + Sync + 'static> From<&Filter<T>> for ResetTarget {
    fn from(filter: &Filter<T>) -> Self {
        Self {
            filters: vec![filter.definition()],
        }
    }
}

impl<T: Send + Sync + 'static> From<Filter<T>> for ResetTarget {
    fn from(filter: Filter<T>) -> Self {
        Self::from(&filter)
    }
}

impl<T: Send + Sync + 'static> From<&FilterComposition<T>> for ResetTarget {
    fn from(composition: &FilterComposition<T>) -> Self {
        Self {
            filters: composition.filters().iter().map(Filter::definition).collect(),
        }
    }
}

impl<T: Send + Sync + 'static> From<FilterComposition<T>> for ResetTarget {
    fn from(composition: FilterComposition<T>) -> Self {
        Self::from(&composition)
    }
}
