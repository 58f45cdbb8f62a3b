//! Planar pose recovery from four marker-corner correspondences.
//!
//! Pipeline: normalize pixels by the intrinsics, estimate the plane-to-image
//! homography by DLT, peel rotation and translation out of its columns,
//! project the raw rotation onto SO(3) by polar decomposition, and resolve
//! the planar-homography normal ambiguity.
//!
//! `solve` is deterministic and order-sensitive: callers must pass corners in
//! a consistent winding. Because two corner-labeling conventions are
//! plausible for a square target, the intended usage is
//! [`solve_either_winding`]: solve both, keep the lower reprojection error.

use nalgebra::{Matrix3, Vector2, Vector3};
use thiserror::Error;

use super::camera::CameraIntrinsics;
use super::homography::{dlt_homography, HomographyError};

/// A homography column shorter than this is treated as degenerate.
const MIN_COLUMN_NORM: f64 = 1e-8;

/// Conservative threshold for the normal-ambiguity correction: flip only
/// when the recovered normal clearly points back at the camera, so noise at
/// grazing angles cannot oscillate the sign frame to frame.
const NORMAL_FLIP_THRESHOLD: f64 = 0.5;

/// Index permutation for the alternate corner-labeling convention
/// (top-right and bottom-left exchanged).
const ALTERNATE_WINDING: [usize; 4] = [0, 3, 2, 1];

/// Marker pose in the camera's intrinsic frame (+x right, +y down,
/// +z forward). After a successful solve, `rotation` is proper orthogonal
/// (det = +1) and `translation.z > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl MarkerPose {
    /// Distance from the camera center to the marker origin, in meters.
    pub fn distance(&self) -> f64 {
        self.translation.norm()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoseError {
    #[error("need exactly 4 correspondences, got {image} image / {object} object points")]
    WrongPointCount { image: usize, object: usize },
    #[error(transparent)]
    Homography(#[from] HomographyError),
    #[error("degenerate homography: column norm below {MIN_COLUMN_NORM:e}")]
    DegenerateHomography,
    #[error("svd failed on the rotation orthogonalization")]
    OrthogonalizationFailed,
}

/// The four object-space corners of a square marker with half-size `h`,
/// centered at the origin of its own Z=0 plane. Image-aligned order
/// (x right, y down): TL, TR, BR, BL.
pub fn marker_object_corners(half_size: f64) -> [Vector2<f64>; 4] {
    [
        Vector2::new(-half_size, -half_size),
        Vector2::new(half_size, -half_size),
        Vector2::new(half_size, half_size),
        Vector2::new(-half_size, half_size),
    ]
}

/// Recover the marker pose from exactly four pixel/object correspondences.
///
/// Fails (non-fatally, per frame) on a wrong correspondence count, a
/// near-singular homography, or an SVD failure at either decomposition step.
pub fn solve(
    image_points: &[Vector2<f64>],
    object_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Result<MarkerPose, PoseError> {
    if image_points.len() != 4 || object_points.len() != 4 {
        return Err(PoseError::WrongPointCount {
            image: image_points.len(),
            object: object_points.len(),
        });
    }

    let normalized: Vec<Vector2<f64>> =
        image_points.iter().map(|p| intrinsics.normalize(p)).collect();
    let h = dlt_homography(object_points, &normalized)?;

    let h1 = h.column(0).into_owned();
    let h2 = h.column(1).into_owned();
    let h3 = h.column(2).into_owned();

    let norm1 = h1.norm();
    let norm2 = h2.norm();
    if norm1 < MIN_COLUMN_NORM || norm2 < MIN_COLUMN_NORM {
        return Err(PoseError::DegenerateHomography);
    }

    // Scale fixing ||r1|| = ||r2|| = 1 on average; sign chosen so the marker
    // sits in front of the camera.
    let mut lambda = (norm1 + norm2) / 2.0;
    if h3.z / lambda < 0.0 {
        lambda = -lambda;
    }

    let r1 = h1 / lambda;
    let r2 = h2 / lambda;
    let t = h3 / lambda;
    let r3 = r1.cross(&r2);

    let mut raw = Matrix3::zeros();
    raw.set_column(0, &r1);
    raw.set_column(1, &r2);
    raw.set_column(2, &r3);

    // Nearest proper rotation via polar decomposition.
    let svd = raw.svd(true, true);
    let u = svd.u.ok_or(PoseError::OrthogonalizationFailed)?;
    let v_t = svd.v_t.ok_or(PoseError::OrthogonalizationFailed)?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r = u_flipped * v_t;
    }

    // Planar-homography normal ambiguity: the marker's surface normal
    // (third rotation column) must face away from the camera along the
    // viewing ray. If it points back toward the camera instead, the SVD
    // picked the reflected branch; compose a 180° rotation about the
    // marker's local X axis (negate columns 1 and 2).
    let normal = r.column(2).into_owned();
    let to_camera = -t.normalize();
    if normal.dot(&to_camera) > NORMAL_FLIP_THRESHOLD {
        r.column_mut(1).neg_mut();
        r.column_mut(2).neg_mut();
    }

    Ok(MarkerPose {
        rotation: r,
        translation: t,
    })
}

/// Mean squared pixel distance between the observed corners and the object
/// corners projected through `pose`. Returns `+inf` if any projected corner
/// falls at or behind the image plane.
pub fn reprojection_error(
    image_points: &[Vector2<f64>],
    object_points: &[Vector2<f64>],
    pose: &MarkerPose,
    intrinsics: &CameraIntrinsics,
) -> f64 {
    let mut sum = 0.0;
    for (pi, po) in image_points.iter().zip(object_points.iter()) {
        let p_cam = pose.rotation * Vector3::new(po.x, po.y, 0.0) + pose.translation;
        match intrinsics.project(&p_cam) {
            Some(px) => sum += (px - pi).norm_squared(),
            None => return f64::INFINITY,
        }
    }
    sum / image_points.len() as f64
}

/// Solve with both plausible corner-labeling conventions and keep the result
/// with the lower reprojection error (returned alongside the pose).
///
/// This is the documented usage contract of the estimator: `solve` itself is
/// winding-sensitive, and a square target admits two labelings that only the
/// reprojection residual can tell apart.
pub fn solve_either_winding(
    image_points: &[Vector2<f64>; 4],
    object_points: &[Vector2<f64>; 4],
    intrinsics: &CameraIntrinsics,
) -> Result<(MarkerPose, f64), PoseError> {
    let primary = solve(image_points, object_points, intrinsics)
        .map(|p| {
            let err = reprojection_error(image_points, object_points, &p, intrinsics);
            (p, err)
        });

    let reordered = ALTERNATE_WINDING.map(|i| image_points[i]);
    let alternate = solve(&reordered, object_points, intrinsics).map(|p| {
        let err = reprojection_error(&reordered, object_points, &p, intrinsics);
        (p, err)
    });

    match (primary, alternate) {
        (Ok(a), Ok(b)) => Ok(if a.1 <= b.1 { a } else { b }),
        (Ok(a), Err(_)) => Ok(a),
        (Err(_), Ok(b)) => Ok(b),
        (Err(e), Err(_)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    const INTR: CameraIntrinsics = CameraIntrinsics {
        fx: 1000.0,
        fy: 1000.0,
        cx: 500.0,
        cy: 500.0,
    };

    /// Project object corners through a ground-truth pose and the pinhole.
    fn project_corners(
        corners: &[Vector2<f64>; 4],
        rotation: &Matrix3<f64>,
        translation: &Vector3<f64>,
    ) -> [Vector2<f64>; 4] {
        corners.map(|c| {
            let p_cam = rotation * Vector3::new(c.x, c.y, 0.0) + translation;
            INTR.project(&p_cam).expect("corner in front of camera")
        })
    }

    #[test]
    fn recovers_fronto_parallel_marker() {
        // h = 0.0125, t = (0, 0, 0.5): corners land ±25 px off center.
        let object = marker_object_corners(0.0125);
        let t = Vector3::new(0.0, 0.0, 0.5);
        let image = project_corners(&object, &Matrix3::identity(), &t);
        for px in &image {
            assert_relative_eq!((px.x - 500.0).abs(), 25.0, epsilon = 1e-9);
            assert_relative_eq!((px.y - 500.0).abs(), 25.0, epsilon = 1e-9);
        }

        let pose = solve(&image, &object, &INTR).unwrap();
        assert_relative_eq!(pose.translation.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(pose.translation.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(pose.translation.z, 0.5, epsilon = 1e-4);
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((pose.rotation[(r, c)] - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn recovers_rotated_marker() {
        let object = marker_object_corners(0.02);
        let r_true = Rotation3::from_euler_angles(0.25, -0.15, 0.3).into_inner();
        let t_true = Vector3::new(0.04, -0.03, 0.6);
        let image = project_corners(&object, &r_true, &t_true);

        let pose = solve(&image, &object, &INTR).unwrap();

        // Proper orthogonal within tolerance.
        let rtr = pose.rotation.transpose() * pose.rotation;
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((rtr[(r, c)] - expected).abs() < 1e-4);
            }
        }
        assert_relative_eq!(pose.rotation.determinant(), 1.0, epsilon = 1e-6);

        // Exact correspondences: reprojection is essentially zero.
        let err = reprojection_error(&image, &object, &pose, &INTR);
        assert!(err <= 1e-3, "reprojection error {err} px^2");

        for i in 0..3 {
            assert_relative_eq!(pose.translation[i], t_true[i], epsilon = 1e-6);
            for j in 0..3 {
                assert_relative_eq!(pose.rotation[(i, j)], r_true[(i, j)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn solve_is_deterministic() {
        let object = marker_object_corners(0.0125);
        let image = project_corners(
            &object,
            &Rotation3::from_euler_angles(0.1, 0.2, -0.1).into_inner(),
            &Vector3::new(0.01, 0.02, 0.4),
        );
        let a = solve(&image, &object, &INTR).unwrap();
        let b = solve(&image, &object, &INTR).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn corrects_reflected_normal_branch() {
        // Corners generated by a pose whose +Z normal points back at the
        // camera (a 180° local-X flip of a front-facing marker). The raw
        // decomposition recovers that reflected branch; solve must return a
        // rotation whose normal faces away from the camera again.
        let object = marker_object_corners(0.0125);
        let r_flipped = Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, //
            0.0, 0.0, -1.0,
        );
        let t = Vector3::new(0.0, 0.0, 0.5);
        let image = project_corners(&object, &r_flipped, &t);

        let pose = solve(&image, &object, &INTR).unwrap();
        let normal = pose.rotation.column(2).into_owned();
        let to_camera = -pose.translation.normalize();
        assert!(
            normal.dot(&to_camera) <= 0.5,
            "normal still points at the camera: dot = {}",
            normal.dot(&to_camera)
        );
        assert_relative_eq!(pose.rotation.determinant(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_wrong_point_count() {
        let object = marker_object_corners(0.0125);
        let err = solve(&object[..3], &object, &INTR).unwrap_err();
        assert_eq!(err, PoseError::WrongPointCount { image: 3, object: 4 });
    }

    #[test]
    fn reprojection_error_is_infinite_behind_camera() {
        let object = marker_object_corners(0.0125);
        let image = project_corners(&object, &Matrix3::identity(), &Vector3::new(0.0, 0.0, 0.5));
        let behind = MarkerPose {
            rotation: Matrix3::identity(),
            translation: Vector3::new(0.0, 0.0, -0.5),
        };
        assert!(reprojection_error(&image, &object, &behind, &INTR).is_infinite());
    }

    #[test]
    fn either_winding_recovers_swapped_corners() {
        // Same detector defect the io adapter fixes: TR and BL exchanged.
        let object = marker_object_corners(0.0125);
        let r_true = Rotation3::from_euler_angles(0.1, -0.05, 0.2).into_inner();
        let t_true = Vector3::new(0.02, 0.01, 0.45);
        let image = project_corners(&object, &r_true, &t_true);
        let swapped = [image[0], image[3], image[2], image[1]];

        let (pose, err) = solve_either_winding(&swapped, &object, &INTR).unwrap();
        assert!(err <= 1e-3, "reprojection error {err} px^2");
        for i in 0..3 {
            assert_relative_eq!(pose.translation[i], t_true[i], epsilon = 1e-6);
        }
    }
}
