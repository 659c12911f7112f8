//! The argument accepted when binding filters.

use std::fmt;
use std::str::FromStr;

use super::{Filter, FilterBuilder, FilterComposition};

/// What a consumer asks to bind: a bare param name, a built filter, or a
/// composition.
///
/// The variants can only be produced from the corresponding values, so there
/// is no path from plain data to a filter. Arbitrary JSON converts to
/// [`FilterArg::Invalid`] unless it is a bare string name, which is how a
/// serialized filter gets rejected instead of silently losing its parse,
/// validate and default behavior.
pub enum FilterArg<T> {
    /// A bare param name, bound with a default-only filter.
    Name(FilterBuilder<T>),
    /// A filter built with [`Filter::builder`] or [`Filter::builder_with`].
    Single(Filter<T>),
    /// A composition of filters.
    Composite(FilterComposition<T>),
    /// Anything else. Binding it fails with an invalid-argument error.
    Invalid {
        /// Description of what was passed
        reason: String,
    },
}

impl<T> FilterArg<T> {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterArg::Name(_) => "a bare param name",
            FilterArg::Single(_) => "a filter",
            FilterArg::Composite(_) => "a filter composition",
            FilterArg::Invalid { .. } => "a plain value",
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FilterArg::Invalid { .. })
    }
}

impl<T> fmt::Debug for FilterArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterArg::Name(builder) => f.debug_tuple("Name").field(&builder.param_name).finish(),
            FilterArg::Single(filter) => f.debug_tuple("Single").field(filter).finish(),
            FilterArg::Composite(composition) => {
                f.debug_tuple("Composite").field(composition).finish()
            }
            FilterArg::Invalid { reason } => {
                f.debug_struct("Invalid").field("reason", reason).finish()
            }
        }
    }
}

impl<T> From<&str> for FilterArg<T>
where
    T: FromStr + fmt::Display + Send + Sync + 'static,
{
    fn from(param_name: &str) -> Self {
        FilterArg::Name(Filter::builder(param_name))
    }
}

impl<T> From<String> for FilterArg<T>
where
    T: FromStr + fmt::Display + Send + Sync + 'static,
{
    fn from(param_name: String) -> Self {
        FilterArg::Name(Filter::builder(param_name))
    }
}

impl<T> From<Filter<T>> for FilterArg<T> {
    fn from(filter: Filter<T>) -> Self {
        FilterArg::Single(filter)
    }
}

impl<T> From<&Filter<T>> for FilterArg<T> {
    fn from(filter: &Filter<T>) -> Self {
        FilterArg::Single(filter.clone())
    }
}

impl<T> From<FilterComposition<T>> for FilterArg<T> {
    fn from(composition: FilterComposition<T>) -> Self {
        FilterArg::Composite(composition)
    }
}

impl<T> From<&FilterComposition<T>> for FilterArg<T> {
    fn from(composition: &FilterComposition<T>) -> Self {
        FilterArg::Composite(composition.clone())
    }
}

impl<T> From<serde_json::Value> for FilterArg<T>
where
    T: FromStr + fmt::Display + Send + Sync + 'static,
{
    fn from(value: serde_json::Value) -> Self {
        let kind = match value {
            serde_json::Value::String(param_name) => return FilterArg::from(param_name),
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };

        FilterArg::Invalid {
            reason: format!(
                "expected a param name or a filter built with Filter::builder, got a plain {kind}; \
                 build filters instead of constructing their configuration by hand"
            ),
        }
    }
}
