//! Building filters and compositions through the public API.

use paramsync::{CompositeValue, Filter, FilterArg, FilterComposition};

use crate::helpers::*;

#[test]
fn test_filter_requires_param_name() {
    let err = Filter::new("").unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.module(), "filter");
}

#[test]
fn test_default_parse_format_validate() {
    let filter = Filter::new("foo").unwrap();

    assert_eq!(filter.param_name(), "foo");
    assert_eq!(filter.parse(Some("foo")), Some("foo".to_string()));
    assert_eq!(filter.format(&"123".to_string()), Some("123".to_string()));
    assert!(filter.validate("foo"));
}

#[test]
fn test_reset_value_falls_back_to_default() {
    let filter = Filter::<String>::builder("foo")
        .default_value("bar")
        .build()
        .unwrap();

    assert_eq!(filter.reset_value().map(String::as_str), filter.default_value());
    assert_eq!(filter.reset_value(), Some(&"bar".to_string()));
}

#[test]
fn test_overridden_callbacks_are_used() {
    let parse_calls = CallCounter::new();
    let format_calls = CallCounter::new();
    let validate_calls = CallCounter::new();
    let (parse_counter, format_counter, validate_counter) =
        (parse_calls.clone(), format_calls.clone(), validate_calls.clone());

    let filter = Filter::<i64>::builder("foo")
        .parse(move |raw| {
            parse_counter.hit();
            raw.and_then(|raw| raw.parse().ok())
        })
        .format(move |value| {
            format_counter.hit();
            Some(format!("{value:03}"))
        })
        .validate(move |raw, parse| {
            validate_counter.hit();
            parse(Some(raw)).is_some()
        })
        .build()
        .unwrap();

    assert_eq!(filter.parse(Some("12")), Some(12));
    assert_eq!(filter.format(&7), Some("007".to_string()));
    assert!(!filter.validate("foo"));

    assert_eq!(format_calls.count(), 1);
    assert_eq!(validate_calls.count(), 1);
    // once directly, once through the validator
    assert_eq!(parse_calls.count(), 2);
}

#[test]
fn test_serialized_filter_is_not_a_filter() {
    let filter = Filter::new("foo").unwrap();
    let round_tripped: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&filter).unwrap()).unwrap();

    let arg: FilterArg<String> = round_tripped.into();
    assert!(arg.is_invalid());

    let arg: FilterArg<String> = FilterArg::from(&filter);
    assert!(!arg.is_invalid());
}

#[test]
fn test_composition_requires_filters() {
    let err = FilterComposition::<i64>::new(Vec::new()).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_composition_refuses_plain_values() {
    let min = int_filter("min", "0");

    let err = FilterComposition::<i64>::from_args(vec![serde_json::json!({}).into()], None).unwrap_err();
    assert!(err.is_invalid_argument());

    let err = FilterComposition::from_args(vec![FilterArg::from(&min), serde_json::json!({}).into()], None)
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_composition_validator_is_forwarded() {
    let composition = FilterComposition::with_validator(
        vec![int_filter("min", "0"), int_filter("max", "100")],
        |_: &CompositeValue<i64>| false,
    )
    .unwrap();

    assert!(!composition.validate(&range(10, 20)));

    let permissive = FilterComposition::new(vec![int_filter("min", "0"), int_filter("max", "100")]).unwrap();
    assert!(permissive.validate(&range(10, 20)));
    assert!(permissive.validate(&range(20, 10)));
}
