//! Filter definitions.
//!
//! A [`Filter`] describes how one named query-string parameter is read and
//! written: how the raw string is parsed into a typed value, how a value is
//! formatted back, which raw strings are valid, and which default applies when
//! the parameter is missing. Filters are built once by configuration code and
//! shared by every consumer that binds them.
//!
//! Filters can only be produced by [`FilterBuilder::build`]. There is no way to
//! assemble one from plain data, so a serialized filter cannot stand in for a
//! real one and silently skip its validation and default logic.
//!
//! ```
//! use paramsync::Filter;
//!
//! let page = Filter::<u32>::builder("page")
//!     .validate(|raw, parse| parse(Some(raw)).is_some())
//!     .default_value("1")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(page.param_name(), "page");
//! assert_eq!(page.parse(Some("7")), Some(7));
//! assert!(!page.validate("seven"));
//! assert_eq!(page.reset_value(), Some(&1));
//! ```

use std::any::TypeId;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::Result;

pub mod arg;
pub mod composition;
pub mod errors;

pub use arg::FilterArg;
pub use composition::{CompositeValue, FilterComposition};
pub use errors::FilterError;

/// Parses a raw param value. `None` input means the param is absent.
pub type ParseFn<T> = Arc<dyn Fn(Option<&str>) -> Option<T> + Send + Sync>;

/// Formats a value into a raw param string. `None` means the formatter could
/// not produce a string, which setters report as a contract violation.
pub type FormatFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Decides whether a raw param value is acceptable. Receives the filter's
/// parser so validation can be expressed in terms of the parsed value.
pub type ValidateFn<T> =
    Arc<dyn Fn(&str, &dyn Fn(Option<&str>) -> Option<T>) -> bool + Send + Sync>;

/// Identity of a built filter.
///
/// Every call to [`FilterBuilder::build`] mints a fresh id; clones of a
/// [`Filter`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(Uuid);

impl FilterId {
    fn new() -> Self {
        FilterId(Uuid::new_v4())
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-erased view of a filter.
///
/// The registry and the reset operation work across filters of different
/// value types, so they see filters through this trait.
pub trait FilterDefinition: Send + Sync + fmt::Debug {
    /// The query-string parameter this filter reads and writes.
    fn param_name(&self) -> &str;

    /// Identity of the filter.
    fn id(&self) -> FilterId;

    /// Whether the filter was built with any custom configuration.
    fn has_overrides(&self) -> bool;

    /// The Rust type values are parsed into.
    fn value_type(&self) -> TypeId;

    /// The raw default value, if any.
    fn default_value(&self) -> Option<&str>;

    /// The raw string a reset writes, or `None` if a reset removes the param.
    fn reset_param(&self) -> Result<Option<String>>;
}

struct FilterInner<T> {
    id: FilterId,
    param_name: String,
    parse: ParseFn<T>,
    format: FormatFn<T>,
    validate: ValidateFn<T>,
    default_value: Option<String>,
    reset_value: Option<T>,
    has_overrides: bool,
    value_type: TypeId,
    type_name: &'static str,
}

impl<T> fmt::Debug for FilterInner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("id", &self.id)
            .field("param_name", &self.param_name)
            .field("value_type", &self.type_name)
            .field("default_value", &self.default_value)
            .field("has_reset_value", &self.reset_value.is_some())
            .field("has_overrides", &self.has_overrides)
            .finish()
    }
}

impl<T: Send + Sync + 'static> FilterDefinition for FilterInner<T> {
    fn param_name(&self) -> &str {
        &self.param_name
    }

    fn id(&self) -> FilterId {
        self.id
    }

    fn has_overrides(&self) -> bool {
        self.has_overrides
    }

    fn value_type(&self) -> TypeId {
        self.value_type
    }

    fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    fn reset_param(&self) -> Result<Option<String>> {
        match &self.reset_value {
            Some(value) => format_with(&self.param_name, &self.format, value).map(Some),
            None => Ok(None),
        }
    }
}

fn format_with<T>(param_name: &str, format: &FormatFn<T>, value: &T) -> Result<String> {
    format(value).ok_or_else(|| {
        tracing::warn!(param = %param_name, "Formatter did not produce a string");
        FilterError::FormatterContractViolation {
            param_name: param_name.to_string(),
        }
        .into()
    })
}

/// A named, typed view over one query-string parameter.
///
/// Cheap to clone; clones share identity, so binding the same filter from many
/// consumers never counts as a configuration collision.
pub struct Filter<T> {
    inner: Arc<FilterInner<T>>,
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl Filter<String> {
    /// Create a filter with no custom configuration.
    ///
    /// Values are the raw strings from the query string.
    pub fn new(param_name: impl Into<String>) -> Result<Self> {
        Filter::builder(param_name).build()
    }
}

impl<T> Filter<T>
where
    T: FromStr + fmt::Display + Send + Sync + 'static,
{
    /// Start building a filter whose parse and format default to the value
    /// type's [`FromStr`] and [`Display`](fmt::Display) implementations.
    pub fn builder(param_name: impl Into<String>) -> FilterBuilder<T> {
        FilterBuilder::new(
            param_name.into(),
            Arc::new(|raw: Option<&str>| raw.and_then(|raw| raw.parse::<T>().ok())),
            Arc::new(|value: &T| Some(value.to_string())),
            false,
        )
    }
}

impl<T: Send + Sync + 'static> Filter<T> {
    /// Start building a filter for a value type without string conversions.
    pub fn builder_with<P, F>(param_name: impl Into<String>, parse: P, format: F) -> FilterBuilder<T>
    where
        P: Fn(Option<&str>) -> Option<T> + Send + Sync + 'static,
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        FilterBuilder::new(param_name.into(), Arc::new(parse), Arc::new(format), true)
    }

    /// The query-string parameter this filter reads and writes.
    pub fn param_name(&self) -> &str {
        &self.inner.param_name
    }

    pub fn id(&self) -> FilterId {
        self.inner.id
    }

    /// Parse a raw value. `None` stands for an absent param.
    pub fn parse(&self, raw: Option<&str>) -> Option<T> {
        (self.inner.parse)(raw)
    }

    /// Format a value with the configured formatter.
    ///
    /// Returns `None` when the formatter does not produce a string; use
    /// [`Filter::format_param`] to turn that into an error.
    pub fn format(&self, value: &T) -> Option<String> {
        (self.inner.format)(value)
    }

    /// Format a value, reporting a formatter failure as
    /// [`FilterError::FormatterContractViolation`].
    pub fn format_param(&self, value: &T) -> Result<String> {
        format_with(&self.inner.param_name, &self.inner.format, value)
    }

    /// Check a raw value with the configured validator.
    pub fn validate(&self, raw: &str) -> bool {
        (self.inner.validate)(raw, &*self.inner.parse)
    }

    /// The raw default value used when the param is absent.
    pub fn default_value(&self) -> Option<&str> {
        self.inner.default_value.as_deref()
    }

    /// The value a reset restores.
    pub fn reset_value(&self) -> Option<&T> {
        self.inner.reset_value.as_ref()
    }

    /// Whether the filter carries any custom configuration.
    pub fn has_overrides(&self) -> bool {
        self.inner.has_overrides
    }

    /// Type-erased handle to this filter, sharing its identity.
    pub fn definition(&self) -> Arc<dyn FilterDefinition> {
        self.inner.clone()
    }
}

impl<T> Serialize for Filter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Descriptor<'a> {
            param_name: &'a str,
            value_type: &'a str,
            default_value: Option<&'a str>,
            has_overrides: bool,
        }

        Descriptor {
            param_name: &self.inner.param_name,
            value_type: self.inner.type_name,
            default_value: self.inner.default_value.as_deref(),
            has_overrides: self.inner.has_overrides,
        }
        .serialize(serializer)
    }
}

/// Builder for [`Filter`].
///
/// Every configuration call marks the filter as carrying overrides, which the
/// registry uses when deciding whether two filters for the same param clash.
pub struct FilterBuilder<T> {
    param_name: String,
    parse: ParseFn<T>,
    format: FormatFn<T>,
    validate: Option<ValidateFn<T>>,
    default_value: Option<String>,
    reset_value: Option<T>,
    has_overrides: bool,
}

impl<T: Send + Sync + 'static> FilterBuilder<T> {
    fn new(param_name: String, parse: ParseFn<T>, format: FormatFn<T>, has_overrides: bool) -> Self {
        Self {
            param_name,
            parse,
            format,
            validate: None,
            default_value: None,
            reset_value: None,
            has_overrides,
        }
    }

    /// The param name this builder will produce a filter for.
    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    /// Replace the parser.
    pub fn parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<T> + Send + Sync + 'static,
    {
        self.parse = Arc::new(parse);
        self.has_overrides = true;
        self
    }

    /// Replace the formatter.
    pub fn format<F>(mut self, format: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.format = Arc::new(format);
        self.has_overrides = true;
        self
    }

    /// Set the validator. Without one every raw value is accepted.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&str, &dyn Fn(Option<&str>) -> Option<T>) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self.has_overrides = true;
        self
    }

    /// Raw value to parse when the param is absent.
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self.has_overrides = true;
        self
    }

    /// Value a reset restores, instead of the parsed default value.
    pub fn reset_value(mut self, reset_value: T) -> Self {
        self.reset_value = Some(reset_value);
        self.has_overrides = true;
        self
    }

    /// Build the filter.
    ///
    /// Fails with [`FilterError::InvalidArgument`] when the param name is empty.
    pub fn build(self) -> Result<Filter<T>> {
        if self.param_name.is_empty() {
            tracing::warn!("Rejected filter with an empty param name");
            return Err(FilterError::invalid_argument("param name cannot be empty").into());
        }

        let reset_value = match self.reset_value {
            Some(value) => Some(value),
            None => self
                .default_value
                .as_deref()
                .and_then(|default| (self.parse)(Some(default))),
        };

        let validate: ValidateFn<T> = match self.validate {
            Some(validate) => validate,
            None => Arc::new(|_: &str, _: &dyn Fn(Option<&str>) -> Option<T>| true),
        };

        let inner = FilterInner {
            id: FilterId::new(),
            param_name: self.param_name,
            parse: self.parse,
            format: self.format,
            validate,
            default_value: self.default_value,
            reset_value,
            has_overrides: self.has_overrides,
            value_type: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        };

        tracing::debug!(param = %inner.param_name, id = %inner.id, "Built filter");

        Ok(Filter {
            inner: Arc::new(inner),
        })
    }
}
