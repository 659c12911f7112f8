//! Constants used throughout the paramsync library.

/// Separator that introduces the query component of a URL (`?`).
pub const QUERY_PREFIX: char = '?';

/// Label shown for bindings whose resolved value is undefined.
pub const UNDEFINED_LABEL: &str = "undefined";
