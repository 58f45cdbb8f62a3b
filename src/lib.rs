//! Real-time 6-DoF pose tracking of planar square fiducials for AR overlay.
//!
//! The core turns per-frame detections (identifier + four corner pixels)
//! plus camera intrinsics/extrinsics into smoothed world-frame poses:
//! homography-based pose recovery, rotation orthogonalization, ambiguity
//! disambiguation, and per-target temporal smoothing with lifecycle
//! management. Camera capture, symbol detection, and rendering are external
//! collaborators.

pub mod geometry;
pub mod io;
pub mod system;
pub mod tracking;
