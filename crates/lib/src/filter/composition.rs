//! Filter compositions.
//!
//! A [`FilterComposition`] groups several filters behind one joint validator
//! so that a binding can treat them as one value, for example a numeric range
//! kept in `min` and `max` params where `min` must not exceed `max`.

use std::fmt;
use std::sync::Arc;

use super::{Filter, FilterArg, FilterError};
use crate::Result;
use crate::constants::UNDEFINED_LABEL;

/// Joint validator over the resolved members of a composition.
pub type JointValidateFn<T> = Arc<dyn Fn(&CompositeValue<T>) -> bool + Send + Sync>;

/// Resolved or requested values of a composition, keyed by param name.
///
/// Entries keep insertion order. A member mapped to `None` is undefined: when
/// read, the param was missing without a default or failed validation; when
/// passed to a setter, the param is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeValue<T> {
    entries: Vec<(String, Option<T>)>,
}

impl<T> Default for CompositeValue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> CompositeValue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a defined member.
    pub fn with(mut self, param_name: impl Into<String>, value: T) -> Self {
        self.insert(param_name, Some(value));
        self
    }

    /// Add or replace an undefined member.
    pub fn cleared(mut self, param_name: impl Into<String>) -> Self {
        self.insert(param_name, None);
        self
    }

    /// Insert a member, keeping the position of an existing one.
    pub fn insert(&mut self, param_name: impl Into<String>, value: Option<T>) {
        let param_name = param_name.into();
        match self.entries.iter_mut().find(|(name, _)| *name == param_name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((param_name, value)),
        }
    }

    /// The defined value of a member.
    pub fn get(&self, param_name: &str) -> Option<&T> {
        self.entry(param_name).and_then(Option::as_ref)
    }

    /// The member slot: `None` if the member is missing, `Some(None)` if it is
    /// present but undefined.
    pub fn entry(&self, param_name: &str) -> Option<&Option<T>> {
        self.entries
            .iter()
            .find(|(name, _)| name == param_name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, param_name: &str) -> bool {
        self.entry(param_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&T>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

impl<K: Into<String>, T> FromIterator<(K, Option<T>)> for CompositeValue<T> {
    fn from_iter<I: IntoIterator<Item = (K, Option<T>)>>(iter: I) -> Self {
        let mut value = CompositeValue::new();
        for (name, member) in iter {
            value.insert(name, member);
        }
        value
    }
}

impl<T: fmt::Display> fmt::Display for CompositeValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{name}: {value}")?,
                None => write!(f, "{name}: {UNDEFINED_LABEL}")?,
            }
        }
        f.write_str("}")
    }
}

struct CompositionInner<T> {
    filters: Vec<Filter<T>>,
    validate: JointValidateFn<T>,
}

/// Several filters read and written as one value.
pub struct FilterComposition<T> {
    inner: Arc<CompositionInner<T>>,
}

impl<T> Clone for FilterComposition<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for FilterComposition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterComposition")
            .field("filters", &self.inner.filters)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> FilterComposition<T> {
    /// Compose filters with a joint validator that accepts everything.
    pub fn new(filters: Vec<Filter<T>>) -> Result<Self> {
        Self::build(filters, Arc::new(|_: &CompositeValue<T>| true))
    }

    /// Compose filters under a joint validator.
    pub fn with_validator<F>(filters: Vec<Filter<T>>, validate: F) -> Result<Self>
    where
        F: Fn(&CompositeValue<T>) -> bool + Send + Sync + 'static,
    {
        Self::build(filters, Arc::new(validate))
    }

    /// Compose from filter arguments, accepting only built single filters.
    ///
    /// Bare names, nested compositions and invalid arguments are rejected with
    /// [`FilterError::InvalidArgument`].
    pub fn from_args(args: Vec<FilterArg<T>>, validate: Option<JointValidateFn<T>>) -> Result<Self> {
        let mut filters = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                FilterArg::Single(filter) => filters.push(filter),
                other => {
                    tracing::warn!(arg = ?other, "Rejected non-filter composition member");
                    return Err(FilterError::invalid_argument(format!(
                        "compositions only accept filters built with Filter::builder, got {}",
                        other.kind()
                    ))
                    .into());
                }
            }
        }

        match validate {
            Some(validate) => Self::build(filters, validate),
            None => Self::new(filters),
        }
    }

    fn build(filters: Vec<Filter<T>>, validate: JointValidateFn<T>) -> Result<Self> {
        if filters.is_empty() {
            tracing::warn!("Rejected empty filter composition");
            return Err(FilterError::invalid_argument("a composition needs at least one filter").into());
        }

        Ok(Self {
            inner: Arc::new(CompositionInner { filters, validate }),
        })
    }

    /// The composed filters, in order.
    pub fn filters(&self) -> &[Filter<T>] {
        &self.inner.filters
    }

    /// Param names of the composed filters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.inner.filters.iter().map(Filter::param_name)
    }

    /// Run the joint validator.
    pub fn validate(&self, value: &CompositeValue<T>) -> bool {
        (self.inner.validate)(value)
    }
}
