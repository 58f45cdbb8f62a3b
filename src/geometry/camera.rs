//! Pinhole camera model: per-session intrinsics and per-frame extrinsics.
//!
//! Both are supplied by the external tracking session. The intrinsics follow
//! the undistorted pinhole convention used throughout: +x right, +y down,
//! +z forward (optical axis).

use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics in pixels. No distortion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length along x, in pixels.
    pub fx: f64,
    /// Focal length along y, in pixels.
    pub fy: f64,
    /// Principal point x, in pixels.
    pub cx: f64,
    /// Principal point y, in pixels.
    pub cy: f64,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Map a pixel coordinate onto the normalized image plane (z = 1).
    pub fn normalize(&self, pixel: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new((pixel.x - self.cx) / self.fx, (pixel.y - self.cy) / self.fy)
    }

    /// Project a camera-frame point to pixels. `None` if the point is at or
    /// behind the image plane (non-positive depth).
    pub fn project(&self, p_cam: &Vector3<f64>) -> Option<Vector2<f64>> {
        if p_cam.z <= 0.0 {
            return None;
        }
        Some(Vector2::new(
            self.fx * p_cam.x / p_cam.z + self.cx,
            self.fy * p_cam.y / p_cam.z + self.cy,
        ))
    }
}

/// Camera pose in the world frame, supplied per frame by the tracking
/// session. `rotation` is proper orthogonal (det = +1).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraExtrinsics {
    pub rotation: Matrix3<f64>,
    pub position: Vector3<f64>,
}

impl CameraExtrinsics {
    pub fn new(rotation: Matrix3<f64>, position: Vector3<f64>) -> Self {
        Self { rotation, position }
    }

    /// Camera at the world origin, axes aligned.
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            position: Vector3::zeros(),
        }
    }
}
