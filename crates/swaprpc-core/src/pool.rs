//! Two-slot rotating pool of transport handles.
//!
//! The pool keeps an active handle in slot A or B and replaces it with a
//! freshly built one once `rotation_interval` has elapsed, so DNS is
//! re-resolved and stale sockets are dropped. Rotation never mutates a
//! handle: the new one goes into the other slot and the flag flips, both
//! under one lock. Calls that already cloned the old handle finish on it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::TransportError;
use crate::transport::{HttpTransport, TransportConfig, TransportFactory};

/// Age after which the active handle is replaced.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(60);

/// Logical label of a pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// An immutable, fully built transport handle.
///
/// Cloning is cheap and keeps the underlying transport alive, which is how
/// an in-flight call survives a rotation.
#[derive(Clone)]
pub struct TransportHandle {
    transport: Arc<dyn HttpTransport>,
    generation: u64,
    created_at: Instant,
}

impl TransportHandle {
    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// 1 for the handle built at construction, +1 per rotation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Returns `true` if both handles wrap the same transport instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl std::fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHandle")
            .field("base_url", &self.transport.base_url().as_str())
            .field("generation", &self.generation)
            .finish()
    }
}

struct PoolState {
    active_slot: Slot,
    active: TransportHandle,
    /// The handle rotated out last time; it stays until the next rotation.
    standby: Option<TransportHandle>,
    last_created_at: Instant,
    generation: u64,
    rotations: u64,
}

/// Rotating two-slot transport pool. Owned by exactly one client.
pub struct TransportPool {
    factory: Arc<dyn TransportFactory>,
    config: TransportConfig,
    rotation_interval: Duration,
    state: Mutex<PoolState>,
}

impl TransportPool {
    /// Build the first handle into slot A.
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        config: TransportConfig,
        rotation_interval: Duration,
    ) -> Result<Self, TransportError> {
        let now = Instant::now();
        let transport = factory.create(&config)?;
        let active = TransportHandle {
            transport,
            generation: 1,
            created_at: now,
        };
        Ok(Self {
            factory,
            config,
            rotation_interval,
            state: Mutex::new(PoolState {
                active_slot: Slot::A,
                active,
                standby: None,
                last_created_at: now,
                generation: 1,
                rotations: 0,
            }),
        })
    }

    /// Return the active handle, rotating first if it is older than the
    /// rotation interval.
    ///
    /// The staleness check and the rotation share one critical section, so a
    /// burst of callers at the boundary rotates exactly once. If the factory
    /// fails the previous handle stays active and the error is returned.
    pub fn get_or_refresh(&self) -> Result<TransportHandle, TransportError> {
        let mut state = self.lock();
        if state.last_created_at.elapsed() > self.rotation_interval {
            self.create_new(&mut state)?;
        }
        Ok(state.active.clone())
    }

    /// Rotate unconditionally and return the new active handle.
    pub fn rotate(&self) -> Result<TransportHandle, TransportError> {
        let mut state = self.lock();
        self.create_new(&mut state)?;
        Ok(state.active.clone())
    }

    /// Number of rotations since construction.
    pub fn rotation_count(&self) -> u64 {
        self.lock().rotations
    }

    pub fn active_slot(&self) -> Slot {
        self.lock().active_slot
    }

    pub fn rotation_interval(&self) -> Duration {
        self.rotation_interval
    }

    fn create_new(&self, state: &mut PoolState) -> Result<(), TransportError> {
        let transport = self.factory.create(&self.config)?;
        let now = Instant::now();
        let generation = state.generation + 1;
        let fresh = TransportHandle {
            transport,
            generation,
            created_at: now,
        };

        let retired = std::mem::replace(&mut state.active, fresh);
        state.standby = Some(retired);
        state.active_slot = state.active_slot.other();
        state.last_created_at = now;
        state.generation = generation;
        state.rotations += 1;

        tracing::debug!(
            generation,
            slot = %state.active_slot,
            url = %self.config.base_url,
            "rotated transport handle"
        );
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // State is only written after the factory returns, so a poisoned
        // guard still holds a consistent pool.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TransportPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("TransportPool")
            .field("active_slot", &state.active_slot)
            .field("generation", &state.generation)
            .field("rotations", &state.rotations)
            .finish()
    }
}
