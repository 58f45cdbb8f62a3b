//! State shared between the frame thread and the detection worker.
//!
//! Holds the single-flight latch that guarantees at most one detection+solve
//! pass is ever in flight, the shutdown flag, and a read-mostly snapshot of
//! each target's latest smoothed pose for synchronous queries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};
use parking_lot::RwLock;

use crate::tracking::TargetState;

/// Latest published pose of one target, readable from any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSnapshot {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub state: TargetState,
}

/// Shared state accessible by the frame thread and the detection worker.
pub struct SharedState {
    /// Latest smoothed world pose per identifier. Worker writes, anyone reads.
    pub snapshots: RwLock<HashMap<String, TargetSnapshot>>,

    /// Single-flight latch: set while a detection pass is in flight. New
    /// frames arriving while set are dropped, never queued.
    pass_in_flight: AtomicBool,

    /// Request the worker to finish its current pass and exit.
    shutdown_requested: AtomicBool,
}

impl SharedState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshots: RwLock::new(HashMap::new()),
            pass_in_flight: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
        })
    }

    /// Atomically claim the single-flight slot. Returns false if a pass is
    /// already running; the caller must then drop the frame.
    pub fn try_begin_pass(&self) -> bool {
        self.pass_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the single-flight slot after a pass completes.
    pub fn end_pass(&self) {
        self.pass_in_flight.store(false, Ordering::SeqCst);
    }

    pub fn is_pass_in_flight(&self) -> bool {
        self.pass_in_flight.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Latest published pose for one identifier, if currently tracked.
    pub fn snapshot(&self, id: &str) -> Option<TargetSnapshot> {
        self.snapshots.read().get(id).cloned()
    }
}
