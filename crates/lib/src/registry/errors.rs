//! Error types for the filter registry.

use thiserror::Error;

/// Errors raised when registering filter uses.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A different filter configuration is already active for the param.
    #[error(
        "Filter for param '{param_name}' conflicts with an active filter of a different configuration; \
         define the filter once and share it between consumers"
    )]
    ConfigurationCollision {
        /// The param both configurations claim
        param_name: String,
    },
}

impl RegistryError {
    /// Check if this error is a configuration collision.
    pub fn is_collision(&self) -> bool {
        matches!(self, RegistryError::ConfigurationCollision { .. })
    }

    /// Get the param name the error is about.
    pub fn param_name(&self) -> &str {
        match self {
            RegistryError::ConfigurationCollision { param_name } => param_name,
        }
    }
}

impl From<RegistryError> for crate::Error {
    fn from(err: RegistryError) -> Self {
        crate::Error::Registry(err)
    }
}
