//! Restoring bound filters to their reset values.

use paramsync::{Filter, FilterBinding, FilterComposition, SetFilterOptions};

use crate::helpers::*;

#[test]
fn test_reset_deletes_filters_without_default() {
    let ctx = TestContext::new();
    let foo: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    let bar: FilterBinding<String> = ctx.provider().bind("bar", || {}).unwrap();

    foo.set_value("foo".to_string(), SetFilterOptions::default()).unwrap();
    bar.set_value("bar".to_string(), SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.search(), "?bar=bar&foo=foo");

    let search = ctx.provider().reset(SetFilterOptions::default()).unwrap();

    assert_eq!(search, "");
    assert_eq!(ctx.search(), "");
    assert_eq!(foo.value().into_single(), None);
    assert_eq!(bar.value().into_single(), None);
}

#[test]
fn test_reset_restores_defaults() {
    let ctx = TestContext::new();
    let filter = Filter::<String>::builder("foo").default_value("foo").build().unwrap();
    let foo = ctx.provider().bind(&filter, || {}).unwrap();

    foo.set_value("bar".to_string(), SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.search(), "?foo=bar");

    ctx.provider().reset(SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.search(), "?foo=foo");
    assert_eq!(foo.value().into_single(), Some("foo".to_string()));
}

#[test]
fn test_reset_leaves_unbound_params_alone() {
    let ctx = TestContext::new().with_search("legacyParam=10");

    ctx.provider().reset(SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.search(), "?legacyParam=10");
}

#[test]
fn test_reset_mixed_scenario() {
    let ctx = TestContext::new().with_search("legacyParam=10");
    let bar_filter = Filter::<String>::builder("bar").default_value("x").build().unwrap();
    let foo: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    let bar = ctx.provider().bind(&bar_filter, || {}).unwrap();

    foo.set_value("custom".to_string(), SetFilterOptions::default()).unwrap();
    bar.set_value("custom".to_string(), SetFilterOptions::default()).unwrap();

    let search = ctx.provider().reset(SetFilterOptions::default()).unwrap();

    assert_eq!(search, "bar=x&legacyParam=10");
    assert_eq!(foo.value().into_single(), None);
    assert_eq!(bar.value().into_single(), Some("x".to_string()));
}

#[test]
fn test_dry_reset() {
    let ctx = TestContext::new().with_search("foo=bar");
    let foo: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();

    let search = ctx.provider().reset(SetFilterOptions::dry_run()).unwrap();

    assert_eq!(search, "");
    assert_eq!(ctx.search(), "?foo=bar");
    assert_eq!(foo.value().into_single(), Some("bar".to_string()));
}

#[test]
fn test_explicit_reset_value_wins_over_default() {
    let ctx = TestContext::new().with_search("page=7");
    let page = Filter::<i64>::builder("page")
        .default_value("1")
        .reset_value(0)
        .build()
        .unwrap();
    let binding = ctx.provider().bind(&page, || {}).unwrap();

    ctx.provider().reset(SetFilterOptions::default()).unwrap();
    assert_eq!(ctx.search(), "?page=0");
    assert_eq!(binding.value().into_single(), Some(0));
}

#[test]
fn test_reset_targeted_filters_only() {
    let ctx = TestContext::new().with_search("min=5&max=6&page=7");
    let range = range_composition();
    let page = int_filter("page", "1");
    let _range = ctx.provider().bind(&range, || {}).unwrap();
    let _page = ctx.provider().bind(&page, || {}).unwrap();

    let search = ctx
        .provider()
        .reset_filters(&range, SetFilterOptions::default())
        .unwrap();
    assert_eq!(search, "max=100&min=0&page=7");

    let search = ctx.provider().reset_filters(&page, SetFilterOptions::dry_run()).unwrap();
    assert_eq!(search, "max=100&min=0&page=1");
}

#[test]
fn test_failed_reset_format_commits_nothing() {
    let ctx = TestContext::new().with_search("a=1&b=2");
    let a = Filter::<i64>::builder("a").default_value("0").build().unwrap();
    let b = Filter::<i64>::builder("b")
        .default_value("0")
        .format(|_| None)
        .build()
        .unwrap();
    let composition = FilterComposition::new(vec![a, b]).unwrap();
    let _binding = ctx.provider().bind(&composition, || {}).unwrap();

    let err = ctx.provider().reset(SetFilterOptions::default()).unwrap_err();

    assert!(err.is_formatter_violation());
    assert_eq!(ctx.search(), "?a=1&b=2");
}
