//! Per-caller session state and the store that owns it.
//!
//! Each session carries the caller's origin, distance threshold, pagination
//! cursor, and the affinity map computed on first use. Sessions are looked up
//! by a caller-supplied [`SessionId`] and handed out behind a mutex so that
//! requests for the same session run one at a time while different sessions
//! proceed independently.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pagination::PageCursor;
use crate::place::AffinityMap;

/// Caller-supplied session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a session key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Mutable state of one session.
///
/// Changing the origin or threshold returns the cursor to the first page.
/// The cached affinity survives those changes and is only dropped by
/// [`SessionState::clear`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    origin: Option<String>,
    distance_threshold: Option<f64>,
    cursor: PageCursor,
    cached_affinity: Option<AffinityMap>,
}

impl SessionState {
    /// Origin set by the caller, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Store `origin` and rewind the cursor.
    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.origin = Some(origin.into());
        self.cursor.reset();
    }

    /// Distance threshold set by the caller, in miles.
    #[must_use]
    pub const fn distance_threshold(&self) -> Option<f64> {
        self.distance_threshold
    }

    /// Store `miles` and rewind the cursor.
    pub const fn set_distance_threshold(&mut self, miles: f64) {
        self.distance_threshold = Some(miles);
        self.cursor.reset();
    }

    /// Pagination cursor.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Mutable access to the pagination cursor.
    pub const fn cursor_mut(&mut self) -> &mut PageCursor {
        &mut self.cursor
    }

    /// Reinforced affinity cached for this session.
    #[must_use]
    pub const fn cached_affinity(&self) -> Option<&AffinityMap> {
        self.cached_affinity.as_ref()
    }

    /// Return the cached affinity, computing and storing it on first use.
    pub fn affinity_or_insert_with<E>(
        &mut self,
        compute: impl FnOnce() -> Result<AffinityMap, E>,
    ) -> Result<&AffinityMap, E> {
        if self.cached_affinity.is_none() {
            self.cached_affinity = Some(compute()?);
        }
        Ok(self.cached_affinity.get_or_insert_with(AffinityMap::new))
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Shared, lockable session state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Lock a session, recovering the state if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, SessionState> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lifecycle of sessions keyed by [`SessionId`].
pub trait SessionStore {
    /// Return the session for `id`, creating an empty one when absent.
    fn open(&self, id: &SessionId) -> SessionHandle;

    /// Return the session for `id` without creating it.
    fn lookup(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drop the session for `id`, reporting whether it existed.
    fn clear(&self, id: &SessionId) -> bool;
}

/// Process-local [`SessionStore`].
///
/// # Examples
/// ```
/// use holiday_core::{MemorySessionStore, SessionId, SessionStore, lock_session};
///
/// let store = MemorySessionStore::default();
/// let id = SessionId::new("caller-1");
/// lock_session(&store.open(&id)).set_origin("Fresno");
///
/// let handle = store.lookup(&id).expect("session exists");
/// assert_eq!(lock_session(&handle).origin(), Some("Fresno"));
/// assert!(store.clear(&id));
/// assert!(store.lookup(&id).is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Report whether no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn open(&self, id: &SessionId) -> SessionHandle {
        Arc::clone(self.sessions().entry(id.clone()).or_default())
    }

    fn lookup(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions().get(id).map(Arc::clone)
    }

    fn clear(&self, id: &SessionId) -> bool {
        self.sessions().remove(id).is_some()
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn open(&self, id: &SessionId) -> SessionHandle {
        (**self).open(id)
    }

    fn lookup(&self, id: &SessionId) -> Option<SessionHandle> {
        (**self).lookup(id)
    }

    fn clear(&self, id: &SessionId) -> bool {
        (**self).clear(id)
    }
}
