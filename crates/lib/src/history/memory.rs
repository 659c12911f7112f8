//! In-memory navigation source for tests.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{History, Location, LocationListener, Unlisten};
use crate::constants::QUERY_PREFIX;

/// Navigation source that keeps its entries in memory.
///
/// Searches are normalized the way browsers report them: a non-empty search
/// always starts with `?`, and a bare `?` becomes empty. Listeners run after
/// every navigation, outside the internal lock.
///
/// # Example
///
/// ```
/// use paramsync::{History, MemoryHistory};
///
/// let history = MemoryHistory::new();
/// history.push("page=2");
/// assert_eq!(history.location().search, "?page=2");
///
/// history.back();
/// assert_eq!(history.location().search, "");
/// ```
#[derive(Clone, Default)]
pub struct MemoryHistory {
    state: Arc<Mutex<MemoryHistoryState>>,
}

struct MemoryHistoryState {
    entries: Vec<Location>,
    index: usize,
    listeners: Vec<(u64, LocationListener)>,
    next_listener: u64,
}

impl Default for MemoryHistoryState {
    fn default() -> Self {
        Self {
            entries: vec![Location::new("/", "")],
            index: 0,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }
}

impl MemoryHistoryState {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }
}

fn normalize_search(search: &str) -> String {
    let bare = search.strip_prefix(QUERY_PREFIX).unwrap_or(search);
    if bare.is_empty() {
        String::new()
    } else {
        format!("{QUERY_PREFIX}{bare}")
    }
}

impl MemoryHistory {
    /// Create a history with a single entry at `/` and an empty search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history whose single entry has the given search.
    pub fn with_search(search: &str) -> Self {
        let history = Self::new();
        history.lock().entries[0].search = normalize_search(search);
        history
    }

    fn lock(&self) -> MutexGuard<'_, MemoryHistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries in the stack. Never zero.
    pub fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.lock().index
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Move `delta` entries through the stack, clamped to its bounds.
    ///
    /// Listeners are only invoked when the current entry actually moves.
    pub fn go(&self, delta: isize) {
        let mut state = self.lock();
        let last = state.entries.len() - 1;
        let target = state.index.saturating_add_signed(delta).min(last);
        if target == state.index {
            return;
        }
        state.index = target;
        drop(state);
        self.emit();
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    fn emit(&self) {
        let (location, listeners) = {
            let state = self.lock();
            let listeners: Vec<LocationListener> = state
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            (state.current().clone(), listeners)
        };

        for listener in listeners {
            listener(&location);
        }
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryHistory")
            .field("entries", &state.entries)
            .field("index", &state.index)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.lock().current().clone()
    }

    fn push(&self, search: &str) {
        let mut state = self.lock();
        let location = Location {
            pathname: state.current().pathname.clone(),
            search: normalize_search(search),
        };
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(location);
        state.index = next;
        drop(state);
        self.emit();
    }

    fn replace(&self, search: &str) {
        let mut state = self.lock();
        let index = state.index;
        state.entries[index].search = normalize_search(search);
        drop(state);
        self.emit();
    }

    fn listen(&self, listener: LocationListener) -> Unlisten {
        let mut state = self.lock();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push((id, listener));

        let weak: Weak<Mutex<MemoryHistoryState>> = Arc::downgrade(&self.state);
        Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}
