//! Registration and configuration collisions as seen through bindings.

use paramsync::{Filter, FilterBinding, FilterComposition};

use crate::helpers::*;

#[test]
fn test_conflicting_validators_collide() {
    let ctx = TestContext::new();
    let foo_one = Filter::<String>::builder("foo").validate(|_, _| true).build().unwrap();
    let foo_two = Filter::<String>::builder("foo").validate(|_, _| false).build().unwrap();

    let _first = ctx.provider().bind(&foo_one, || {}).unwrap();
    let err = ctx.provider().bind(&foo_two, || {}).unwrap_err();

    assert!(err.is_collision());
    assert_eq!(err.param_name(), Some("foo"));
}

#[test]
fn test_bare_name_and_configured_filter_collide() {
    let ctx = TestContext::new();
    let configured = Filter::<String>::builder("foo").parse(|_| Some(String::new())).build().unwrap();

    let _bare: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    let err = ctx.provider().bind(&configured, || {}).unwrap_err();
    assert!(err.is_collision());
}

#[test]
fn test_same_filter_and_bare_names_share_the_param() {
    let ctx = TestContext::new();
    let page = int_filter("page", "1");

    let _a = ctx.provider().bind(&page, || {}).unwrap();
    let _b = ctx.provider().bind(page.clone(), || {}).unwrap();
    assert_eq!(ctx.provider().registry().use_count("page"), 2);

    let _c: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    let _d: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    assert_eq!(ctx.provider().registry().use_count("foo"), 2);
}

#[test]
fn test_different_providers_never_collide() {
    let ctx = TestContext::new();
    let sibling = ctx.sibling_provider();
    let configured = Filter::<String>::builder("foo").parse(|_| Some(String::new())).build().unwrap();

    let _bare: FilterBinding<String> = ctx.provider().bind("foo", || {}).unwrap();
    let _configured = sibling.bind(&configured, || {}).unwrap();
}

#[test]
fn test_deactivation_releases_the_param() {
    let ctx = TestContext::new();
    let foo_one = Filter::<String>::builder("foo").default_value("a").build().unwrap();
    let foo_two = Filter::<String>::builder("foo").default_value("b").build().unwrap();

    let first = ctx.provider().bind(&foo_one, || {}).unwrap();
    assert!(ctx.provider().bind(&foo_two, || {}).unwrap_err().is_collision());

    first.deactivate();
    first.deactivate();
    assert!(!first.is_active());
    assert_eq!(ctx.provider().registry().use_count("foo"), 0);

    let second = ctx.provider().bind(&foo_two, || {}).unwrap();
    drop(second);
    assert!(ctx.provider().registry().is_empty());
}

#[test]
fn test_failed_composition_rolls_back_earlier_members() {
    let ctx = TestContext::new();
    let other_max = Filter::<i64>::builder("max").default_value("999").build().unwrap();
    let _max = ctx.provider().bind(&other_max, || {}).unwrap();

    let range = FilterComposition::new(vec![int_filter("min", "0"), int_filter("max", "100")]).unwrap();
    let err = ctx.provider().bind(&range, || {}).unwrap_err();

    assert!(err.is_collision());
    assert_eq!(ctx.provider().registry().use_count("min"), 0);
    assert_eq!(ctx.provider().registry().use_count("max"), 1);
    assert_eq!(ctx.provider().observer().subscriber_count("min"), 0);
}

#[test]
fn test_all_filters_lists_each_param_once() {
    let ctx = TestContext::new();
    let range = range_composition();

    let _range = ctx.provider().bind(&range, || {}).unwrap();
    let _min = ctx.provider().bind(&range.filters()[0], || {}).unwrap();

    let names: Vec<String> = ctx
        .provider()
        .registry()
        .all_filters()
        .iter()
        .map(|filter| filter.param_name().to_string())
        .collect();
    assert_eq!(names, vec!["max".to_string(), "min".to_string()]);
    assert_eq!(ctx.provider().registry().use_count("min"), 2);
}
