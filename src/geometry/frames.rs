//! Coordinate frame conventions and the camera→world boundary transform.
//!
//! The pose solver works in the camera's intrinsic frame (RDF: +x right,
//! +y down, +z forward along the optical axis). The consuming render engine
//! uses the opposite handedness on y and z (+y up, +z backward), so every
//! pose crosses a fixed axis-convention correction `F = diag(1, -1, -1)` on
//! its way out, then the per-frame camera extrinsics lift it into the world:
//!
//! ```text
//! world_position = p_cam + R_cam · (F · t)
//! world_rotation = R_cam · F · R
//! ```
//!
//! `det(F) = +1`, so world rotations stay proper.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use super::camera::CameraExtrinsics;
use super::planar_pose::MarkerPose;

/// Gimbal-lock guard for the Euler extraction.
const EULER_SY_EPS: f64 = 1e-6;

/// Fixed correction from the camera's intrinsic axis convention
/// (+y down, +z forward) to the render engine's (+y up, +z backward).
#[rustfmt::skip]
pub fn axis_convention_flip() -> Matrix3<f64> {
    Matrix3::new(
        1.0,  0.0,  0.0,
        0.0, -1.0,  0.0,
        0.0,  0.0, -1.0,
    )
}

/// Lift a camera-frame marker pose into the world frame through the
/// session-supplied camera extrinsics.
pub fn marker_pose_to_world(
    pose: &MarkerPose,
    extrinsics: &CameraExtrinsics,
) -> (Vector3<f64>, UnitQuaternion<f64>) {
    let flip = axis_convention_flip();
    let position = extrinsics.position + extrinsics.rotation * (flip * pose.translation);
    let rotation_mat = extrinsics.rotation * flip * pose.rotation;
    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_mat));
    (position, rotation)
}

/// Euler angles (radians) from a rotation matrix, X-Y-Z decomposition
/// (`R = Rx · Ry · Rz`). Diagnostics only; falls back to a fixed-z branch
/// near gimbal lock.
pub fn euler_xyz(r: &Matrix3<f64>) -> Vector3<f64> {
    let sy = (r[(0, 0)] * r[(0, 0)] + r[(0, 1)] * r[(0, 1)]).sqrt();
    if sy < EULER_SY_EPS {
        // cos(y) ~ 0: x and z are coupled, pin z to zero.
        Vector3::new(
            r[(2, 1)].atan2(r[(1, 1)]),
            r[(0, 2)].atan2(sy),
            0.0,
        )
    } else {
        Vector3::new(
            (-r[(1, 2)]).atan2(r[(2, 2)]),
            r[(0, 2)].atan2(sy),
            (-r[(0, 1)]).atan2(r[(0, 0)]),
        )
    }
}

/// Euler angles in degrees, for the diagnostic display text.
pub fn euler_xyz_degrees(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    euler_xyz(rotation.to_rotation_matrix().matrix()).map(|a| a.to_degrees())
}
