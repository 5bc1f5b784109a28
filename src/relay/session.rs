//! Backend session identity and lifetime tracking.
//!
//! Every relayed request opens its own TCP connection. A [`SessionGuard`]
//! lives exactly as long as that connection, so the tracker's count drops
//! back once the response body has been fully streamed or abandoned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// Global counter for session IDs. Only uniqueness matters.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a backend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Counts open backend sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    active_count: Arc<AtomicU64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open session. Returns a guard that decrements on drop.
    pub fn track(&self) -> SessionGuard {
        let active = self.active_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_active_sessions(active);
        SessionGuard {
            active_count: Arc::clone(&self.active_count),
            id: SessionId::new(),
            bytes_relayed: 0,
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Held for the lifetime of one backend connection.
#[derive(Debug)]
pub struct SessionGuard {
    active_count: Arc<AtomicU64>,
    id: SessionId,
    bytes_relayed: u64,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn add_bytes(&mut self, n: usize) {
        self.bytes_relayed += n as u64;
    }

    pub fn bytes_relayed(&self) -> u64 {
        self.bytes_relayed
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let active = self.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_active_sessions(active);
        metrics::record_relayed_bytes(self.bytes_relayed);
        tracing::trace!(
            session_id = %self.id,
            bytes = self.bytes_relayed,
            "Backend session closed"
        );
    }
}
