//! Provider setup, configuration and lifecycle.

use std::sync::Arc;

use paramsync::{
    FilterBinding, FiltersProvider, History, HistoryAction, MemoryHistory, ProviderConfig,
    SetFilterOptions,
};

use crate::helpers::*;

#[test]
fn test_missing_history_is_an_invalid_argument() {
    let err = FiltersProvider::builder()
        .config(ProviderConfig::default())
        .build()
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(err.module(), "provider");
}

#[test]
fn test_location_changes_do_not_touch_history() {
    let history = MemoryHistory::new();
    let provider = FiltersProvider::builder()
        .shared_history(Arc::new(history.clone()))
        .build()
        .unwrap();

    history.push("foo=bar");

    assert_eq!(history.entry_count(), 2);
    assert_eq!(provider.observer().param_info("foo").param_value.as_deref(), Some("bar"));
    assert!(provider.is_listening());
}

#[test]
fn test_config_from_json() {
    let config = ProviderConfig::from_json(
        r#"{ "default_action": "REPLACE", "initial_search": "?page=3" }"#,
    )
    .unwrap();
    let ctx = TestContext::new().with_search("page=1").with_config(config);

    assert_eq!(ctx.search(), "?page=3");
    assert_eq!(ctx.history().entry_count(), 2);

    let page = int_filter("page", "1");
    let binding = ctx.provider().bind(&page, || {}).unwrap();
    assert_eq!(binding.value().into_single(), Some(3));
    assert_eq!(ctx.provider().config().default_action, HistoryAction::Replace);

    binding.set_value(4, SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.history().entry_count(), 2);
    assert_eq!(ctx.search(), "?page=4");
}

#[test]
fn test_bad_config_json() {
    let err = ProviderConfig::from_json("not json").unwrap_err();
    assert!(err.is_config_error());
    assert!(!err.is_invalid_argument());
}

#[test]
fn test_closed_provider_stops_following_history() {
    let ctx = TestContext::new();
    let renders = RenderCounter::new();
    let foo: FilterBinding<String> = ctx.provider().bind("foo", renders.trigger()).unwrap();

    ctx.provider().close();
    ctx.navigate("foo=bar");

    assert_eq!(renders.count(), 0);
    assert_eq!(foo.value().into_single(), None);
    assert_eq!(ctx.history().listener_count(), 0);
}

#[test]
fn test_bindings_keep_provider_alive() {
    let history = MemoryHistory::new();
    let renders = RenderCounter::new();
    let foo: FilterBinding<String> = {
        let provider = FiltersProvider::new(history.clone());
        provider.bind("foo", renders.trigger()).unwrap()
    };

    history.push("foo=bar");
    assert_eq!(renders.count(), 1);
    assert_eq!(foo.value().into_single(), Some("bar".to_string()));

    drop(foo);
    assert_eq!(history.listener_count(), 0);
}

#[test]
fn test_clones_share_scope() {
    let ctx = TestContext::new();
    let clone = ctx.provider().clone();

    let _foo: FilterBinding<String> = clone.bind("foo", || {}).unwrap();
    assert_eq!(ctx.provider().registry().use_count("foo"), 1);

    ctx.navigate("foo=1");
    assert_eq!(clone.observer().param_info("foo").param_value.as_deref(), Some("1"));
}

#[test]
fn test_initial_search_is_written_to_history() {
    let history = MemoryHistory::with_search("legacyParam=10");
    let provider = FiltersProvider::with_config(
        history.clone(),
        ProviderConfig::default().with_initial_search("legacyParam=10&page=3"),
    );

    let page = int_filter("page", "1");
    let binding = provider.bind(&page, || {}).unwrap();
    assert_eq!(history.location().search, "?legacyParam=10&page=3");
    assert_eq!(binding.value().into_single(), Some(3));

    binding.set_value(4, SetFilterOptions::default()).unwrap();
    assert_eq!(history.location().search, "?legacyParam=10&page=4");
}

#[test]
fn test_writes_after_close_keep_later_navigation() {
    let ctx = TestContext::new().with_search("foo=1");
    let foo: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();

    ctx.provider().close();
    ctx.navigate("foo=1&legacyParam=10");

    let search = foo.set_value("2".to_string(), SetFilterOptions::default()).unwrap();
    assert_eq!(search, "foo=2&legacyParam=10");
    assert_eq!(ctx.search(), "?foo=2&legacyParam=10");
    assert_eq!(foo.value().into_single(), Some("1".to_string()));

    ctx.navigate("legacyParam=11");
    let search = ctx.provider().reset(SetFilterOptions::dry_run()).unwrap();
    assert_eq!(search, "legacyParam=11");
}
