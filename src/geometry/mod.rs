//! Geometry: pinhole camera model, planar pose recovery, frame conversions.

pub mod camera;
pub mod frames;
pub mod homography;
pub mod planar_pose;

pub use camera::{CameraExtrinsics, CameraIntrinsics};
pub use planar_pose::{
    marker_object_corners, reprojection_error, solve, solve_either_winding, MarkerPose, PoseError,
};
