//! Pipeline orchestration: detection cadence, single-flight dispatch, the
//! worker thread that owns the registry, and event delivery.
//!
//! The frame thread calls [`TrackingPipeline::submit_frame`] for every camera
//! frame. A detection+solve pass actually runs only every Nth frame, and only
//! if no earlier pass is still in flight; otherwise the frame is dropped —
//! recency beats completeness, and nothing is ever queued beyond the single
//! bounded work slot. All registry and smoother mutation, and all emitted
//! events, happen on the one worker thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Result;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::system::config::TrackerConfig;
use crate::system::messages::{FrameInput, TrackerEvent};
use crate::system::shared_state::{SharedState, TargetSnapshot};
use crate::tracking::TrackRegistry;

/// Owns the detection worker and gates frame submission.
pub struct TrackingPipeline {
    shared: Arc<SharedState>,
    detection_interval: u64,
    frames_seen: u64,
    frame_tx: Option<Sender<FrameInput>>,
    worker: Option<JoinHandle<()>>,
}

impl TrackingPipeline {
    /// Spawn the worker and return the pipeline plus the event stream for
    /// the presentation collaborator.
    pub fn new(config: TrackerConfig) -> Result<(Self, Receiver<TrackerEvent>)> {
        config.validate()?;

        let shared = SharedState::new();
        // Single-capacity work slot; the latch keeps it from ever backing up.
        let (frame_tx, frame_rx) = bounded::<FrameInput>(1);
        let (event_tx, event_rx) = unbounded::<TrackerEvent>();

        let detection_interval = u64::from(config.detection_interval);
        let worker_shared = shared.clone();
        let worker = thread::spawn(move || worker_loop(config, frame_rx, event_tx, worker_shared));

        Ok((
            Self {
                shared,
                detection_interval,
                frames_seen: 0,
                frame_tx: Some(frame_tx),
                worker: Some(worker),
            },
            event_rx,
        ))
    }

    /// Offer one camera frame. Returns true if a detection pass was
    /// dispatched, false if the frame was dropped (off-cadence, a pass still
    /// in flight, or the pipeline shutting down).
    pub fn submit_frame(&mut self, frame: FrameInput) -> bool {
        let index = self.frames_seen;
        self.frames_seen += 1;

        if index % self.detection_interval != 0 {
            return false;
        }
        if !self.shared.try_begin_pass() {
            tracing::trace!(frame = index, "pass in flight, frame dropped");
            return false;
        }
        let Some(tx) = self.frame_tx.as_ref() else {
            self.shared.end_pass();
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                self.shared.end_pass();
                false
            }
        }
    }

    /// Shared state handle for synchronous pose queries.
    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Signal the worker and wait for it to exit.
    pub fn shutdown(&mut self) {
        self.shared.request_shutdown();
        // Dropping the sender unblocks the worker's recv loop.
        self.frame_tx.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TrackingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker: owns the registry, drains the work slot, publishes events and
/// snapshots. The single thread here is what serializes all per-target
/// state mutation.
fn worker_loop(
    config: TrackerConfig,
    frame_rx: Receiver<FrameInput>,
    event_tx: Sender<TrackerEvent>,
    shared: Arc<SharedState>,
) {
    let mut registry = TrackRegistry::new(config);

    for frame in frame_rx.iter() {
        if shared.is_shutdown_requested() {
            shared.end_pass();
            break;
        }

        let events = registry.process_frame(&frame);

        {
            let mut snaps = shared.snapshots.write();
            snaps.clear();
            for (id, target) in registry.iter() {
                if let (Some(position), Some(rotation)) =
                    (target.last_position, target.last_rotation)
                {
                    snaps.insert(
                        id.clone(),
                        TargetSnapshot {
                            position,
                            rotation,
                            state: target.state,
                        },
                    );
                }
            }
        }

        for event in events {
            if event_tx.send(event).is_err() {
                // Presentation side hung up; keep tracking state current anyway.
                tracing::debug!("event receiver disconnected");
                break;
            }
        }

        shared.end_pass();
    }

    tracing::debug!("detection worker exiting");
}
