//! Shared call-dispatch context for object manager clients.
//!
//! One `ClientCallManager` is created per owning component and shared by
//! every client the default pool factory builds. It hands out request ids
//! and keeps call counters across all peers.

use std::sync::atomic::{AtomicU64, Ordering};

use peerpool_proto::RpcResult;

use crate::config::ClientConfig;

/// Snapshot of call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Calls issued since startup.
    pub started: u64,
    /// Calls that received a successful response.
    pub completed: u64,
    /// Calls that failed locally, on the wire, or remotely.
    pub failed: u64,
    /// Calls currently awaiting a response.
    pub in_flight: u64,
}

/// Call-dispatch context shared by clients to all peers.
#[derive(Debug)]
pub struct ClientCallManager {
    config: ClientConfig,
    next_id: AtomicU64,
    next_push_id: AtomicU64,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
}

impl ClientCallManager {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            next_push_id: AtomicU64::new(1),
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Allocate an id shared by all chunks of one object push.
    pub fn next_push_id(&self) -> u64 {
        self.next_push_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a new call and allocate its request id.
    ///
    /// The call stays in flight until the returned guard is finished or
    /// dropped. A guard dropped without `finish` counts as a failure.
    pub fn begin_call(&self) -> (u64, CallGuard<'_>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.started.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        (
            id,
            CallGuard {
                manager: self,
                finished: false,
            },
        )
    }

    pub fn stats(&self) -> CallStats {
        CallStats {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Acquire),
        }
    }
}

impl Default for ClientCallManager {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Tracks one in-flight call. Decrements the in-flight count on drop.
pub struct CallGuard<'a> {
    manager: &'a ClientCallManager,
    finished: bool,
}

impl CallGuard<'_> {
    /// Record the outcome of the call.
    pub fn finish<T>(mut self, result: &RpcResult<T>) {
        let counter = if result.is_ok() {
            &self.manager.completed
        } else {
            &self.manager.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.finished = true;
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // Future dropped mid-call
            self.manager.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.manager.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
