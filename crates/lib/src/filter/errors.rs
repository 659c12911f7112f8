//! Error types for filter construction and formatting.

use thiserror::Error;

/// Errors raised while building filters or turning values into params.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FilterError {
    /// An argument did not describe a usable filter.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Description of what was wrong with the argument
        reason: String,
    },

    /// A formatter did not produce a string for a value.
    #[error("Formatter for param '{param_name}' did not produce a string")]
    FormatterContractViolation {
        /// The param whose formatter failed
        param_name: String,
    },
}

impl FilterError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        FilterError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Check if this error rejected an argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FilterError::InvalidArgument { .. })
    }

    /// Check if this error comes from a misbehaving formatter.
    pub fn is_formatter_violation(&self) -> bool {
        matches!(self, FilterError::FormatterContractViolation { .. })
    }

    /// Get the param name if the error is tied to one.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            FilterError::FormatterContractViolation { param_name } => Some(param_name),
            FilterError::InvalidArgument { .. } => None,
        }
    }
}

impl From<FilterError> for crate::Error {
    fn from(err: FilterError) -> Self {
        crate::Error::Filter(err)
    }
}
