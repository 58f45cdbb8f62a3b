//! Per-identifier target table: creation, coasting, eviction, events.
//!
//! The registry owns one smoother and one lifecycle record per distinct
//! target identifier. It is single-threaded by design: all mutation happens
//! on the worker context that calls [`TrackRegistry::process_frame`], so no
//! two updates to the same identifier's state can ever overlap.

use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::geometry::{frames, marker_object_corners, solve_either_winding};
use crate::system::config::TrackerConfig;
use crate::system::messages::{FrameInput, TrackerEvent};
use crate::tracking::smoother::PoseSmoother;
use crate::tracking::state::TargetState;

/// State bundle for one tracked target. Never shared across identifiers.
#[derive(Debug)]
pub struct TrackedTarget {
    pub state: TargetState,
    /// Consecutive detection passes without a sighting.
    pub misses: u32,
    smoother: PoseSmoother,
    /// Last smoothed output, held while coasting.
    pub last_position: Option<Vector3<f64>>,
    pub last_rotation: Option<UnitQuaternion<f64>>,
}

impl TrackedTarget {
    fn new(window: usize) -> Self {
        Self {
            state: TargetState::Tracking,
            misses: 0,
            smoother: PoseSmoother::new(window),
            last_position: None,
            last_rotation: None,
        }
    }
}

/// Owns every tracked target and turns per-frame detections into events.
pub struct TrackRegistry {
    config: TrackerConfig,
    object_corners: [Vector2<f64>; 4],
    targets: HashMap<String, TrackedTarget>,
}

impl TrackRegistry {
    pub fn new(config: TrackerConfig) -> Self {
        let object_corners = marker_object_corners(config.marker_half_size);
        Self {
            config,
            object_corners,
            targets: HashMap::new(),
        }
    }

    /// Run one detection pass: solve and smooth every detection, age every
    /// known target that went unseen, evict at the miss threshold.
    pub fn process_frame(&mut self, frame: &FrameInput) -> Vec<TrackerEvent> {
        let mut events = Vec::new();

        for detection in &frame.detections {
            let target = self
                .targets
                .entry(detection.id.clone())
                .or_insert_with(|| TrackedTarget::new(self.config.smoothing_window));

            // Any sighting resets the miss counter, even if the solve below
            // fails and this frame's update is skipped.
            target.misses = 0;

            match solve_either_winding(&detection.corners, &self.object_corners, &frame.intrinsics)
            {
                Ok((pose, reproj_err)) => {
                    let distance = pose.distance();
                    let (position, rotation) = frames::marker_pose_to_world(&pose, &frame.extrinsics);
                    let smoothed = target.smoother.push(position, rotation);

                    target.state = TargetState::Tracking;
                    target.last_position = Some(smoothed.position);
                    target.last_rotation = Some(smoothed.rotation);

                    events.push(TrackerEvent::PoseUpdated {
                        id: detection.id.clone(),
                        position: smoothed.position,
                        rotation: smoothed.rotation,
                    });
                    events.push(TrackerEvent::DebugInfo {
                        text: diagnostic_line(
                            &detection.id,
                            distance,
                            &smoothed.position,
                            &smoothed.rotation,
                        ),
                    });
                    tracing::trace!(
                        id = %detection.id,
                        distance,
                        reproj_err,
                        "pose updated"
                    );
                }
                Err(err) => {
                    // Non-fatal: skip this frame's update, keep prior state.
                    // The next scheduled pass is the retry mechanism.
                    tracing::debug!(id = %detection.id, %err, "pose solve failed");
                }
            }
        }

        // Age every target that went unseen this pass.
        let mut lost = Vec::new();
        for (id, target) in &mut self.targets {
            if frame.detections.iter().any(|d| &d.id == id) {
                continue;
            }
            target.misses += 1;
            if target.misses >= self.config.miss_threshold {
                target.smoother.reset();
                lost.push(id.clone());
            } else {
                target.state = TargetState::Coasting;
            }
        }
        for id in lost {
            self.targets.remove(&id);
            tracing::info!(id = %id, "track lost");
            events.push(TrackerEvent::TrackLost { id });
        }

        events
    }

    pub fn get(&self, id: &str) -> Option<&TrackedTarget> {
        self.targets.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrackedTarget)> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Advisory display text: identifier, camera distance, position in meters,
/// orientation in degrees.
fn diagnostic_line(
    id: &str,
    distance: f64,
    position: &Vector3<f64>,
    rotation: &UnitQuaternion<f64>,
) -> String {
    let e = frames::euler_xyz_degrees(rotation);
    format!(
        "{id}: dist {distance:.3} m, pos ({:.3}, {:.3}, {:.3}) m, rot ({:.1}, {:.1}, {:.1})°",
        position.x, position.y, position.z, e.x, e.y, e.z
    )
}
