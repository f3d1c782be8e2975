//! Calling-context identities.
//!
//! Every buffered history belongs to exactly one logical calling context: an
//! OS thread, an async task, or a request. The identity is passed explicitly
//! so isolation does not depend on the host's threading model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for name-derived context ids.
const CONTEXT_NAMESPACE: Uuid = Uuid::from_u128(0x6c6f_6772_6563_4f52_8000_0000_0000_0001);

thread_local! {
    static THREAD_CONTEXT: ContextId = ContextId::new();
}

/// Identity of a logical calling context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Create a new random context id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Deterministic id for a named context (request id, task name).
    ///
    /// The same name always yields the same id.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&CONTEXT_NAMESPACE, name.as_bytes()))
    }

    /// Identity of the calling OS thread.
    ///
    /// Assigned lazily on first use and stable for the life of the thread.
    #[must_use]
    pub fn current() -> Self {
        THREAD_CONTEXT.with(|id| *id)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ContextId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
