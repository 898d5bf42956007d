//! Single-flight guard
//!
//! At most one dialog is open per process. The guard holds a weak handle to
//! the in-flight dialog future; a second caller upgrades it and awaits the
//! same result. The future itself carries a release token, so the slot is
//! cleared the moment the dialog settles (success, error, timeout) or is
//! dropped by every waiter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use tracing::debug;

use crate::error::AskError;

/// One dialog, from provider call to outgoing text.
pub type DialogFuture = BoxFuture<'static, Result<String, AskError>>;

/// Cloneable handle every waiter polls.
pub type InFlight = Shared<DialogFuture>;

type Slot = Arc<Mutex<Option<(u64, WeakShared<DialogFuture>)>>>;

/// Result of acquiring the guard.
pub enum Flight {
    /// This caller opened the dialog.
    Started(InFlight),
    /// A dialog was already open; this caller waits on it.
    Joined(InFlight),
}

impl Flight {
    pub fn is_joined(&self) -> bool {
        matches!(self, Flight::Joined(_))
    }

    pub fn into_future(self) -> InFlight {
        match self {
            Flight::Started(f) | Flight::Joined(f) => f,
        }
    }
}

#[derive(Default)]
pub struct SingleFlight {
    slot: Slot,
    next_id: AtomicU64,
}

impl fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("idle", &self.is_idle())
            .finish()
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the open dialog, or start a new one with `start`.
    ///
    /// `start` is only called when no dialog is in flight.
    pub fn acquire<F>(&self, start: F) -> Flight
    where
        F: FnOnce() -> DialogFuture,
    {
        let mut slot = lock(&self.slot);
        if let Some(existing) = slot.as_ref().and_then(|(_, weak)| weak.upgrade()) {
            return Flight::Joined(existing);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let release = Release {
            slot: Arc::clone(&self.slot),
            id,
        };
        let dialog = start();
        let shared = async move {
            let _release = release;
            dialog.await
        }
        .boxed()
        .shared();

        *slot = shared.downgrade().map(|weak| (id, weak));
        debug!(flight = id, "Dialog guard acquired");
        Flight::Started(shared)
    }

    /// True when no dialog is open.
    pub fn is_idle(&self) -> bool {
        // Upgrade outside the lock: dropping the last handle runs `Release`.
        let current = lock(&self.slot).as_ref().and_then(|(_, weak)| weak.upgrade());
        current.is_none()
    }
}

/// Clears the slot when the dialog future completes or is dropped.
struct Release {
    slot: Slot,
    id: u64,
}

impl Drop for Release {
    fn drop(&mut self) {
        let mut slot = lock(&self.slot);
        if matches!(slot.as_ref(), Some((id, _)) if *id == self.id) {
            *slot = None;
            debug!(flight = self.id, "Dialog guard cleared");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
