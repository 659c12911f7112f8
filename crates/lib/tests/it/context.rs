//! Test context for managing test setup and lifecycle.
//!
//! Provides a composable `TestContext` that explicitly shows what each test needs
//! while keeping the history and the provider alive together.

use paramsync::{FiltersProvider, History, MemoryHistory, ProviderConfig};

/// Test context holding a memory history and a provider listening to it.
///
/// Use the builder methods to set up what the test needs:
/// - `TestContext::new()` - empty history, default configuration
/// - `.with_search(..)` - seed the history before the provider is created
/// - `.with_config(..)` - recreate the provider with a configuration
pub struct TestContext {
    history: MemoryHistory,
    provider: FiltersProvider,
}

impl TestContext {
    /// Create a new test context over an empty history.
    pub fn new() -> Self {
        let history = MemoryHistory::new();
        let provider = FiltersProvider::new(history.clone());
        Self { history, provider }
    }

    /// Push a search onto the history before any binding exists.
    pub fn with_search(self, search: &str) -> Self {
        self.history.push(search);
        self
    }

    /// Replace the provider with one using `config`.
    pub fn with_config(self, config: ProviderConfig) -> Self {
        self.provider.close();
        let provider = FiltersProvider::with_config(self.history.clone(), config);
        Self {
            history: self.history,
            provider,
        }
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    pub fn provider(&self) -> &FiltersProvider {
        &self.provider
    }

    /// The history's current search, including the leading `?`.
    pub fn search(&self) -> String {
        self.history.location().search
    }

    /// Navigate as if the user followed a link.
    pub fn navigate(&self, search: &str) {
        self.history.push(search);
    }

    /// A second provider over the same history.
    pub fn sibling_provider(&self) -> FiltersProvider {
        FiltersProvider::new(self.history.clone())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
