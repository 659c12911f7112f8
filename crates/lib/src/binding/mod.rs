//! Filter bindings.
//!
//! A [`FilterBinding`] is what one consumer holds while it is mounted: the
//! resolved value of a filter or composition, kept current by watching the
//! observer, and the means to write a new value back to the query string.
//!
//! Creating a binding registers every member filter with the provider's
//! registry and subscribes to their params. Deactivating it, explicitly or by
//! dropping it, undoes both.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::Result;
use crate::constants::{QUERY_PREFIX, UNDEFINED_LABEL};
use crate::filter::{CompositeValue, Filter, FilterArg, FilterComposition, FilterError};
use crate::history::SetFilterOptions;
use crate::observer::WatchHandle;
use crate::provider::FiltersProvider;

pub mod resolve;

pub use resolve::{resolve_composition, resolve_filter};

/// Re-render trigger handed to a binding.
pub type Rerender = Arc<dyn Fn() + Send + Sync>;

/// The resolved value of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue<T> {
    /// Value of a single filter
    Single(Option<T>),
    /// Value of a composition, `None` when the joint validator rejects it
    Composite(Option<CompositeValue<T>>),
}

impl<T> FilterValue<T> {
    /// The value of a single filter. Compositions yield `None`.
    pub fn into_single(self) -> Option<T> {
        match self {
            FilterValue::Single(value) => value,
            FilterValue::Composite(_) => None,
        }
    }

    /// The value of a composition. Single filters yield `None`.
    pub fn into_composite(self) -> Option<CompositeValue<T>> {
        match self {
            FilterValue::Composite(value) => value,
            FilterValue::Single(_) => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, FilterValue::Single(None) | FilterValue::Composite(None))
    }
}

impl<T: fmt::Display> fmt::Display for FilterValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Single(Some(value)) => write!(f, "{value}"),
            FilterValue::Composite(Some(value)) => write!(f, "{value}"),
            FilterValue::Single(None) | FilterValue::Composite(None) => f.write_str(UNDEFINED_LABEL),
        }
    }
}

/// A value to write through a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextValue<T> {
    /// One value, for a single filter or a composition of exactly one filter
    Value(T),
    /// Values keyed by param name. A member mapped to `None` is removed.
    Values(CompositeValue<T>),
}

enum Target<T> {
    Single(Filter<T>),
    Composite(FilterComposition<T>),
}

impl<T: Send + Sync + 'static> Target<T> {
    fn filters(&self) -> &[Filter<T>] {
        match self {
            Target::Single(filter) => std::slice::from_ref(filter),
            Target::Composite(composition) => composition.filters(),
        }
    }

    fn resolve(&self, provider: &FiltersProvider) -> FilterValue<T> {
        match self {
            Target::Single(filter) => FilterValue::Single(resolve_filter(filter, provider.observer())),
            Target::Composite(composition) => {
                FilterValue::Composite(resolve_composition(composition, provider.observer()))
            }
        }
    }
}

struct BindingInner<T> {
    provider: FiltersProvider,
    target: Target<T>,
    value: Mutex<FilterValue<T>>,
    watchers: Mutex<Vec<WatchHandle>>,
    rerender: Rerender,
    active: AtomicBool,
}

impl<T: Send + Sync + 'static> BindingInner<T> {
    fn value_lock(&self) -> MutexGuard<'_, FilterValue<T>> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh(&self) {
        let value = self.target.resolve(&self.provider);
        *self.value_lock() = value;
    }

    /// Params after applying `next` to the current snapshot.
    ///
    /// Every value is formatted before any param is written, so a failing
    /// formatter leaves nothing half applied.
    fn next_params(&self, next: NextValue<T>, incrementally: bool) -> Result<crate::QueryParams> {
        let filters = self.target.filters();
        let mut writes: Vec<(&str, Option<String>)> = Vec::with_capacity(filters.len());

        match next {
            NextValue::Value(value) => {
                let [filter] = filters else {
                    tracing::warn!(members = filters.len(), "Rejected single value for a composition");
                    return Err(FilterError::invalid_argument(format!(
                        "a single value can only be set on one filter, this binding has {} members; \
                         pass NextValue::Values instead",
                        filters.len()
                    ))
                    .into());
                };
                writes.push((filter.param_name(), Some(filter.format_param(&value)?)));
            }
            NextValue::Values(values) => {
                for filter in filters {
                    match values.entry(filter.param_name()) {
                        None if incrementally => {}
                        None | Some(None) => writes.push((filter.param_name(), None)),
                        Some(Some(value)) => {
                            writes.push((filter.param_name(), Some(filter.format_param(value)?)));
                        }
                    }
                }
            }
        }

        let mut params = self.provider.current_params();
        for (param_name, raw) in writes {
            match raw {
                Some(raw) => params.set(param_name, raw),
                None => params.delete(param_name),
            }
        }
        Ok(params)
    }

    fn set(&self, next: NextValue<T>, options: SetFilterOptions) -> Result<String> {
        let params = self.next_params(next, options.incrementally)?;
        Ok(self.provider.commit(params, options))
    }

    fn deactivate(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }

        let watchers = std::mem::take(
            &mut *self
                .watchers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for watcher in &watchers {
            watcher.unsubscribe();
        }
        for filter in self.target.filters() {
            self.provider
                .registry()
                .delete_filter_use(filter.definition().as_ref());
        }
        tracing::debug!(params = ?self.param_names(), "Deactivated binding");
    }

    fn param_names(&self) -> Vec<&str> {
        self.target.filters().iter().map(Filter::param_name).collect()
    }
}

/// One consumer's live view of a filter or composition.
///
/// Created by [`FiltersProvider::bind`]. The cached value is recomputed and
/// the re-render trigger invoked whenever one of the bound params changes.
/// Dropping the binding deactivates it.
pub struct FilterBinding<T: Send + Sync + 'static> {
    inner: Arc<BindingInner<T>>,
}

impl<T> FilterBinding<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn activate<F>(provider: &FiltersProvider, arg: FilterArg<T>, rerender: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let target = match arg {
            FilterArg::Name(builder) => Target::Single(builder.build()?),
            FilterArg::Single(filter) => Target::Single(filter),
            FilterArg::Composite(composition) => Target::Composite(composition),
            FilterArg::Invalid { reason } => {
                tracing::warn!(reason = %reason, "Rejected invalid filter argument");
                return Err(FilterError::invalid_argument(reason).into());
            }
        };

        let registry = provider.registry();
        let filters = target.filters();
        for (index, filter) in filters.iter().enumerate() {
            if let Err(err) = registry.register(filter.definition()) {
                for registered in &filters[..index] {
                    registry.delete_filter_use(registered.definition().as_ref());
                }
                return Err(err);
            }
        }

        let value = target.resolve(provider);
        let inner = Arc::new(BindingInner {
            provider: provider.clone(),
            target,
            value: Mutex::new(value),
            watchers: Mutex::new(Vec::new()),
            rerender: Arc::new(rerender),
            active: AtomicBool::new(true),
        });

        let watchers: Vec<WatchHandle> = inner
            .target
            .filters()
            .iter()
            .map(|filter| {
                let weak: Weak<BindingInner<T>> = Arc::downgrade(&inner);
                provider.observer().watch(filter.param_name(), move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.refresh();
                        (inner.rerender)();
                    }
                })
            })
            .collect();
        *inner.watchers.lock().unwrap_or_else(PoisonError::into_inner) = watchers;

        tracing::debug!(params = ?inner.param_names(), "Activated binding");

        Ok(Self { inner })
    }

    /// The resolved value as of the last change to the bound params.
    pub fn value(&self) -> FilterValue<T> {
        self.inner.value_lock().clone()
    }

    /// Write a new value and return the resulting query string.
    pub fn set(&self, next: NextValue<T>, options: SetFilterOptions) -> Result<String> {
        self.inner.set(next, options)
    }

    /// Write a single value.
    pub fn set_value(&self, value: T, options: SetFilterOptions) -> Result<String> {
        self.set(NextValue::Value(value), options)
    }

    /// Write values keyed by param name.
    pub fn set_values(&self, values: CompositeValue<T>, options: SetFilterOptions) -> Result<String> {
        self.set(NextValue::Values(values), options)
    }

    /// Remove every bound param. Always a full write, even when `options`
    /// ask for an incremental one.
    pub fn clear(&self, mut options: SetFilterOptions) -> Result<String> {
        options.incrementally = false;
        self.set(NextValue::Values(CompositeValue::new()), options)
    }

    /// A detached setter that can be handed to other code.
    pub fn setter(&self) -> FilterSetter<T> {
        FilterSetter {
            inner: self.inner.clone(),
        }
    }

    /// The bound param names, in composition order.
    pub fn param_names(&self) -> Vec<&str> {
        self.inner.param_names()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Unsubscribe from the observer and release the registry uses. Calling
    /// it again is a no-op.
    pub fn deactivate(&self) {
        self.inner.deactivate();
    }
}

impl<T> FilterBinding<T>
where
    T: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Label for diagnostics, such as `page: 2` or `min,max: {min: 0, max: 100}`.
    pub fn debug_label(&self) -> String {
        format!("{}: {}", self.param_names().join(","), self.value())
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for FilterBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBinding")
            .field("params", &self.inner.param_names())
            .field("active", &self.inner.active.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Drop for FilterBinding<T> {
    fn drop(&mut self) {
        self.inner.deactivate();
    }
}

/// Writes values for one binding.
///
/// Setters stay usable after the binding is deactivated; they only write to
/// the query string.
pub struct FilterSetter<T> {
    inner: Arc<BindingInner<T>>,
}

impl<T> Clone for FilterSetter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FilterSetter<T>
where
    T: Send + Sync + 'static,
{
    /// Write a new value and return the resulting query string.
    pub fn set(&self, next: NextValue<T>, options: SetFilterOptions) -> Result<String> {
        self.inner.set(next, options)
    }

    /// The link target for `next`: the query string a write would produce,
    /// prefixed with `?`, without committing anything.
    pub fn href(&self, next: NextValue<T>, options: SetFilterOptions) -> Result<String> {
        let search = self.inner.set(next, options.dry())?;
        Ok(format!("{QUERY_PREFIX}{search}"))
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for FilterSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSetter")
            .field("params", &self.inner.param_names())
            .finish()
    }
}
