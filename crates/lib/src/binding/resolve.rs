//! Resolving the current value of filters from the observer snapshot.

use crate::filter::{CompositeValue, Filter, FilterComposition};
use crate::observer::LocationObserver;

/// Resolve one filter against the current snapshot.
///
/// An absent param resolves to the parsed default, or to `None` without
/// calling the parser when there is no default. A present param that fails
/// validation resolves to `None`. Anything else is parsed.
pub fn resolve_filter<T>(filter: &Filter<T>, observer: &LocationObserver) -> Option<T>
where
    T: Send + Sync + 'static,
{
    let info = observer.param_info(filter.param_name());
    match info.param_value {
        None => filter
            .default_value()
            .and_then(|default| filter.parse(Some(default))),
        Some(raw) => {
            if !filter.validate(&raw) {
                tracing::trace!(param = %filter.param_name(), raw = %raw, "Param failed validation");
                return None;
            }
            filter.parse(Some(&raw))
        }
    }
}

/// Resolve every member of a composition and run the joint validator.
///
/// Members that resolve to `None` are kept as undefined entries, so the joint
/// validator sees the whole composition.
pub fn resolve_composition<T>(
    composition: &FilterComposition<T>,
    observer: &LocationObserver,
) -> Option<CompositeValue<T>>
where
    T: Send + Sync + 'static,
{
    let value: CompositeValue<T> = composition
        .filters()
        .iter()
        .map(|filter| (filter.param_name(), resolve_filter(filter, observer)))
        .collect();

    if composition.validate(&value) {
        Some(value)
    } else {
        tracing::trace!(params = ?composition.param_names().collect::<Vec<_>>(), "Composition failed joint validation");
        None
    }
}
