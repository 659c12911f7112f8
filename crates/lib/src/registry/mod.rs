//! Filter registry.
//!
//! Tracks which param names are bound by active consumers, and with which
//! filter. Every activation adds a use and every deactivation removes one; an
//! entry disappears when its last use goes away. Before a consumer activates,
//! the registry decides whether its filter would clash with the one already
//! active for the same param.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use handle_trait::Handle;

use crate::Result;
use crate::filter::FilterDefinition;

pub mod errors;

pub use errors::RegistryError;

/// The active filter for one param and how many bindings use it.
#[derive(Clone)]
pub struct RegistryEntry {
    /// The filter most recently registered for the param
    pub filter: Arc<dyn FilterDefinition>,
    /// Number of active uses, always at least one
    pub use_count: usize,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("param_name", &self.filter.param_name())
            .field("filter", &self.filter.id())
            .field("use_count", &self.use_count)
            .finish()
    }
}

/// Reference-counted map from param name to the filter bound to it.
///
/// One registry exists per provider scope. Clones share state.
#[derive(Clone, Debug, Default, Handle)]
pub struct FilterRegistry {
    entries: Arc<Mutex<HashMap<String, RegistryEntry>>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether activating `filter` would clash with the active filter for its
    /// param.
    ///
    /// Nothing active never clashes, and neither does the same filter. Two
    /// filters built without any configuration are interchangeable as long as
    /// they parse into the same type. Any other pair clashes.
    pub fn is_colliding(&self, filter: &dyn FilterDefinition) -> bool {
        let entries = self.lock();
        let Some(entry) = entries.get(filter.param_name()) else {
            return false;
        };
        let stored = entry.filter.as_ref();

        if stored.id() == filter.id() {
            return false;
        }
        if !stored.has_overrides() && !filter.has_overrides() {
            return stored.value_type() != filter.value_type();
        }
        true
    }

    /// Record one more use of `filter`, storing it as the active filter for
    /// its param.
    pub fn add_filter_use(&self, filter: Arc<dyn FilterDefinition>) {
        let mut entries = self.lock();
        let param_name = filter.param_name().to_string();
        let use_count = match entries.get_mut(&param_name) {
            Some(entry) => {
                entry.filter = filter;
                entry.use_count += 1;
                entry.use_count
            }
            None => {
                entries.insert(
                    param_name.clone(),
                    RegistryEntry {
                        filter,
                        use_count: 1,
                    },
                );
                1
            }
        };

        tracing::debug!(param = %param_name, use_count, "Added filter use");
    }

    /// Drop one use of the param `filter` is bound to. Removes the entry when
    /// no uses remain; does nothing if the param is not registered.
    pub fn delete_filter_use(&self, filter: &dyn FilterDefinition) {
        let mut entries = self.lock();
        let param_name = filter.param_name();
        let Some(entry) = entries.get_mut(param_name) else {
            return;
        };

        entry.use_count = entry.use_count.saturating_sub(1);
        if entry.use_count == 0 {
            entries.remove(param_name);
            tracing::debug!(param = %param_name, "Removed filter from registry");
        } else {
            tracing::debug!(param = %param_name, use_count = entry.use_count, "Deleted filter use");
        }
    }

    /// Check for a collision and record the use in one step.
    pub fn register(&self, filter: Arc<dyn FilterDefinition>) -> Result<()> {
        if self.is_colliding(filter.as_ref()) {
            tracing::warn!(param = %filter.param_name(), filter = %filter.id(), "Filter configuration collision");
            return Err(RegistryError::ConfigurationCollision {
                param_name: filter.param_name().to_string(),
            }
            .into());
        }
        self.add_filter_use(filter);
        Ok(())
    }

    /// The active filters, one per param name, sorted by param name.
    pub fn all_filters(&self) -> Vec<Arc<dyn FilterDefinition>> {
        let entries = self.lock();
        let mut filters: Vec<_> = entries.values().map(|entry| entry.filter.clone()).collect();
        filters.sort_by(|a, b| a.param_name().cmp(b.param_name()));
        filters
    }

    /// The registry entry for a param, if any binding uses it.
    pub fn entry(&self, param_name: &str) -> Option<RegistryEntry> {
        self.lock().get(param_name).cloned()
    }

    /// Number of active uses of a param.
    pub fn use_count(&self, param_name: &str) -> usize {
        self.lock().get(param_name).map_or(0, |entry| entry.use_count)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
