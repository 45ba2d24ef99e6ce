//! Shared source store.
//!
//! Widget instances that share a source identifier on one page share one
//! [`StoreEntry`]. The store is a plain keyed registry with per-key listener
//! lists; it does not arbitrate between writers. Instead every entry carries
//! a version counter and the identity of its last writer, so a write based
//! on a stale version from a different writer is reported as contention
//! (the write still wins).
//!
//! The store is single-threaded: handles are `Rc`-backed clones. Listeners
//! are called with no internal borrow held, so they may read or write the
//! store themselves.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use livepen_core::SourceDocument;
use rustc_hash::FxHashMap;

/// Separator between a source identifier and the page path it is scoped to.
pub const SCOPE_SEPARATOR: &str = "::";

/// Source identifier scoped to one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopedId(String);

impl ScopedId {
    #[must_use]
    pub fn new(source_id: &str, page_path: &str) -> Self {
        Self(format!("{source_id}{SCOPE_SEPARATOR}{page_path}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one writing widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriterId(u64);

impl WriterId {
    /// Writer used by plain [`SharedSourceStore::set`] calls.
    pub const ANONYMOUS: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub state: SourceDocument,
    /// Bumped on every write, starting at 1.
    pub version: u64,
    pub last_writer: WriterId,
}

type Listener = Rc<RefCell<dyn FnMut(&ScopedId, &StoreEntry)>>;

#[derive(Default)]
struct StoreInner {
    entries: FxHashMap<ScopedId, StoreEntry>,
    listeners: FxHashMap<ScopedId, Vec<(u64, Listener)>>,
    next_listener: u64,
    next_writer: u64,
}

/// Handle to a shared source store.
#[derive(Clone, Default)]
pub struct SharedSourceStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl fmt::Debug for SharedSourceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SharedSourceStore")
            .field("entries", &inner.entries.len())
            .field("listener_keys", &inner.listeners.len())
            .finish()
    }
}

impl SharedSourceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a writer identity for one widget instance.
    pub fn register_writer(&self) -> WriterId {
        let mut inner = self.inner.borrow_mut();
        inner.next_writer += 1;
        WriterId(inner.next_writer)
    }

    #[must_use]
    pub fn get(&self, key: &ScopedId) -> Option<StoreEntry> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Store `state` unconditionally. Does not notify.
    pub fn set(&self, key: &ScopedId, state: SourceDocument) -> u64 {
        self.write(key, WriterId::ANONYMOUS, None, state)
    }

    /// Store `state` as `writer`, having last seen `base_version`.
    ///
    /// Returns the new version. When another writer wrote since
    /// `base_version`, the conflict is logged and this write wins anyway.
    /// Does not notify.
    pub fn write(
        &self,
        key: &ScopedId,
        writer: WriterId,
        base_version: Option<u64>,
        state: SourceDocument,
    ) -> u64 {
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                if writer != WriterId::ANONYMOUS
                    && entry.last_writer != writer
                    && base_version != Some(entry.version)
                {
                    tracing::warn!(
                        key = %key,
                        writer = writer.get(),
                        other = entry.last_writer.get(),
                        version = entry.version,
                        ?base_version,
                        "concurrent writes to a shared source from multiple providers"
                    );
                }
                entry.state = state;
                entry.version += 1;
                entry.last_writer = writer;
                entry.version
            }
            None => {
                inner.entries.insert(
                    key.clone(),
                    StoreEntry {
                        state,
                        version: 1,
                        last_writer: writer,
                    },
                );
                1
            }
        }
    }

    /// Register a listener for `key`. Dropping the returned guard unregisters
    /// it.
    pub fn subscribe(
        &self,
        key: &ScopedId,
        listener: impl FnMut(&ScopedId, &StoreEntry) + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_listener += 1;
        let id = inner.next_listener;
        let listener: Listener = Rc::new(RefCell::new(listener));
        inner
            .listeners
            .entry(key.clone())
            .or_default()
            .push((id, listener));
        Subscription {
            store: Rc::downgrade(&self.inner),
            key: key.clone(),
            id,
        }
    }

    /// Invoke every listener of `key` with its current entry.
    ///
    /// Returns how many listeners ran. A listener that is already running
    /// (re-entrant notify) is skipped.
    pub fn notify(&self, key: &ScopedId) -> usize {
        let (entry, listeners) = {
            let inner = self.inner.borrow();
            let Some(entry) = inner.entries.get(key).cloned() else {
                return 0;
            };
            let listeners: Vec<Listener> = inner
                .listeners
                .get(key)
                .map(|list| list.iter().map(|(_, listener)| Rc::clone(listener)).collect())
                .unwrap_or_default();
            (entry, listeners)
        };

        let mut ran = 0;
        for listener in listeners {
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (*callback)(key, &entry);
                ran += 1;
            }
        }
        ran
    }

    #[must_use]
    pub fn listener_count(&self, key: &ScopedId) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(key)
            .map_or(0, Vec::len)
    }
}

/// Registration guard returned by [`SharedSourceStore::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    store: Weak<RefCell<StoreInner>>,
    key: ScopedId,
    id: u64,
}

impl Subscription {
    #[must_use]
    pub fn key(&self) -> &ScopedId {
        &self.key
    }

    /// Unregister now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let Ok(mut inner) = store.try_borrow_mut() else {
            return;
        };
        if let Some(list) = inner.listeners.get_mut(&self.key) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                inner.listeners.remove(&self.key);
            }
        }
    }
}
