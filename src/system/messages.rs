//! Inter-thread message types.
//!
//! `FrameInput` travels from the frame thread to the detection worker;
//! `TrackerEvent`s travel from the worker to the presentation collaborator.

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::geometry::{CameraExtrinsics, CameraIntrinsics};

/// One detected marker, corners already in true geometric order
/// (TL, TR, BR, BL) — see `io::detections` for the upstream relabeling.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Opaque target identifier (e.g. the decoded symbol payload).
    pub id: String,
    /// The four marker corners in pixel coordinates.
    pub corners: [Vector2<f64>; 4],
}

/// Everything the core consumes for one processed frame.
#[derive(Debug, Clone)]
pub struct FrameInput {
    /// Pinhole intrinsics for this frame.
    pub intrinsics: CameraIntrinsics,
    /// Camera pose in the world frame, from the external tracking session.
    pub extrinsics: CameraExtrinsics,
    /// Zero or more detections from the external symbol detector.
    pub detections: Vec<Detection>,
}

/// Event emitted toward the presentation collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A target produced a fresh smoothed world-frame pose.
    PoseUpdated {
        id: String,
        position: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
    },
    /// A target went unseen for the full miss threshold and was evicted.
    TrackLost { id: String },
    /// Advisory diagnostic line (identifier, distance, pose in human units).
    DebugInfo { text: String },
}
