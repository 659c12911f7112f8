//! Location observer.
//!
//! The [`LocationObserver`] owns the canonical snapshot of the current query
//! string and tells interested parties when a specific parameter changes.
//! Notifications are selective: a subscriber watching `page` is invoked only
//! when the value of `page` differs between two snapshots, never because some
//! other parameter moved. This is what keeps re-renders local to the
//! consumers that actually depend on a parameter.
//!
//! # Ordering
//!
//! [`LocationObserver::notify`] swaps in the new snapshot before invoking any
//! subscriber, and holds no lock while subscribers run. Subscribers may read
//! the observer, unsubscribe themselves or others, or trigger a navigation that
//! re-enters `notify`; nested calls complete before the outer loop continues.
//! A subscription removed mid-notification is not invoked afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use handle_trait::Handle;

use crate::QueryParams;


/// Presence and raw value of one parameter in the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamInfo {
    /// Whether the parameter occurs in the query string
    pub has_param: bool,
    /// The first raw value of the parameter
    pub param_value: Option<String>,
}

/// Callback invoked when a watched parameter changes.
pub type WatchCallback = Arc<dyn Fn(&ParamInfo) + Send + Sync>;

/// Identity of one subscription. Removal goes by id, so two identical
/// callbacks registered for the same parameter stay independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    callback: WatchCallback,
}

#[derive(Default)]
struct ObserverState {
    params: QueryParams,
    subscribers: BTreeMap<String, Vec<Subscriber>>,
    next_subscription: u64,
}

impl ObserverState {
    fn is_subscribed(&self, param_name: &str, id: SubscriptionId) -> bool {
        self.subscribers
            .get(param_name)
            .is_some_and(|list| list.iter().any(|subscriber| subscriber.id == id))
    }
}

struct ObserverInner {
    state: Mutex<ObserverState>,
}

impl ObserverInner {
    fn lock(&self) -> MutexGuard<'_, ObserverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(&self, param_name: &str, id: SubscriptionId) {
        let mut state = self.lock();
        let Some(list) = state.subscribers.get_mut(param_name) else {
            return;
        };

        list.retain(|subscriber| subscriber.id != id);
        if list.is_empty() {
            state.subscribers.remove(param_name);
        }
        tracing::debug!(param = %param_name, subscription = id.0, "Removed param watcher");
    }
}

/// Canonical view of the current query string with per-parameter change
/// subscriptions.
///
/// `LocationObserver` is a cheap-to-clone handle; clones share state.
#[derive(Clone, Handle)]
pub struct LocationObserver {
    inner: Arc<ObserverInner>,
}

impl fmt::Debug for LocationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("LocationObserver")
            .field("params", &state.params)
            .field(
                "subscribers",
                &format!("<{} watched params>", state.subscribers.len()),
            )
            .finish()
    }
}

impl Default for LocationObserver {
    fn default() -> Self {
        Self::new("")
    }
}

impl LocationObserver {
    /// Create an observer seeded with a query string.
    pub fn new(initial_search: &str) -> Self {
        Self {
            inner: Arc::new(ObserverInner {
                state: Mutex::new(ObserverState {
                    params: QueryParams::parse(initial_search),
                    ..ObserverState::default()
                }),
            }),
        }
    }

    /// Presence and first value of a parameter in the current snapshot.
    pub fn param_info(&self, param_name: &str) -> ParamInfo {
        let state = self.inner.lock();
        let param_value = state.params.get(param_name).map(str::to_string);
        ParamInfo {
            has_param: param_value.is_some(),
            param_value,
        }
    }

    /// A copy of the current snapshot. Mutating it does not affect the
    /// observer.
    pub fn current_params(&self) -> QueryParams {
        self.inner.lock().params.clone()
    }

    /// Watch one parameter for changes.
    ///
    /// The subscription lives until [`WatchHandle::unsubscribe`] is called or
    /// the handle is dropped.
    pub fn watch<F>(&self, param_name: impl Into<String>, callback: F) -> WatchHandle
    where
        F: Fn(&ParamInfo) + Send + Sync + 'static,
    {
        let param_name = param_name.into();
        let mut state = self.inner.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state
            .subscribers
            .entry(param_name.clone())
            .or_default()
            .push(Subscriber {
                id,
                callback: Arc::new(callback),
            });
        drop(state);

        tracing::debug!(param = %param_name, subscription = id.0, "Added param watcher");

        WatchHandle {
            observer: Arc::downgrade(&self.inner),
            param_name,
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Ingest a new query string.
    ///
    /// Replaces the snapshot, then invokes the subscribers of every watched
    /// parameter whose first value changed. Parameters nobody watches are not
    /// compared.
    pub fn notify(&self, search: &str) {
        let changed: Vec<(String, Vec<(SubscriptionId, WatchCallback)>)> = {
            let mut state = self.inner.lock();
            let previous = std::mem::replace(&mut state.params, QueryParams::parse(search));

            state
                .subscribers
                .iter()
                .filter(|(param_name, _)| previous.get(param_name) != state.params.get(param_name))
                .map(|(param_name, list)| {
                    let callbacks = list
                        .iter()
                        .map(|subscriber| (subscriber.id, subscriber.callback.clone()))
                        .collect();
                    (param_name.clone(), callbacks)
                })
                .collect()
        };

        tracing::trace!(search = %search, changed = changed.len(), "Location notified");

        for (param_name, callbacks) in changed {
            tracing::debug!(param = %param_name, subscribers = callbacks.len(), "Param changed");
            for (id, callback) in callbacks {
                if !self.inner.lock().is_subscribed(&param_name, id) {
                    continue;
                }
                let info = self.param_info(&param_name);
                callback(&info);
            }
        }
    }

    /// Names of the parameters that currently have subscribers, sorted.
    pub fn watched_params(&self) -> Vec<String> {
        self.inner.lock().subscribers.keys().cloned().collect()
    }

    /// Number of subscriptions on one parameter.
    pub fn subscriber_count(&self, param_name: &str) -> usize {
        self.inner
            .lock()
            .subscribers
            .get(param_name)
            .map_or(0, Vec::len)
    }
}

/// Handle to one subscription created by [`LocationObserver::watch`].
///
/// Dropping the handle unsubscribes.
pub struct WatchHandle {
    observer: Weak<ObserverInner>,
    param_name: String,
    id: SubscriptionId,
    active: AtomicBool,
}

impl WatchHandle {
    /// The watched param.
    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    /// Identifier of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove exactly this subscription. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(observer) = self.observer.upgrade() {
            observer.unsubscribe(&self.param_name, self.id);
        }
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("param_name", &self.param_name)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
