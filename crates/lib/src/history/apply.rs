//! Committing params to a navigation source.

use super::{History, HistoryAction, SetFilterOptions};
use crate::QueryParams;

/// Commit `params` to `history` and return the resulting query string.
///
/// Params are sorted by key first so the same logical state always produces
/// the same string. A dry run returns the string without touching history.
/// Without an explicit action the write is a push. The returned string never
/// carries a leading `?`.
pub fn apply_history_action(
    history: &dyn History,
    mut params: QueryParams,
    options: SetFilterOptions,
) -> String {
    params.sort();
    let search = params.to_query_string();

    if options.dry {
        tracing::trace!(search = %search, "Dry run, not committing");
        return search;
    }

    let action = options.action.unwrap_or_default();
    match action {
        HistoryAction::Push => history.push(&search),
        HistoryAction::Replace => history.replace(&search),
    }
    tracing::debug!(search = %search, action = %action, "Committed params");

    search
}
