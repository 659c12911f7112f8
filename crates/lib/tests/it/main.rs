/*! Integration tests for Paramsync.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - filter: Tests for building filters and compositions
 * - observer: Tests for the LocationObserver driven by a history
 * - registry: Tests for registration and collisions across bindings and providers
 * - binding: Tests for reading and writing single filters through bindings
 * - composite: Tests for bindings over filter compositions
 * - reset: Tests for restoring filters to their reset values
 * - provider: Tests for provider setup, configuration and lifecycle
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("paramsync=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod context;
mod filter;
mod provider;
mod registry;
mod reset;
