//! Error types for provider setup.

use thiserror::Error;

/// Errors raised while assembling a [`FiltersProvider`](super::FiltersProvider).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider was built without a navigation source.
    #[error("Invalid argument: the provider was not given a history; pass one with FiltersProviderBuilder::history")]
    MissingHistory,

    /// Provider configuration could not be loaded.
    #[error("Invalid provider configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem
        reason: String,
    },
}

impl ProviderError {
    /// Check if the provider is missing its history.
    pub fn is_missing_history(&self) -> bool {
        matches!(self, ProviderError::MissingHistory)
    }

    /// Check if this error is a configuration problem.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, ProviderError::InvalidConfig { .. })
    }
}

impl From<ProviderError> for crate::Error {
    fn from(err: ProviderError) -> Self {
        crate::Error::Provider(err)
    }
}
