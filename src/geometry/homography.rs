//! Plane-to-image homography estimation via the Direct Linear Transform.
//!
//! The image points are expected on the normalized image plane (intrinsics
//! already divided out), so the recovered H relates marker-plane coordinates
//! directly to viewing rays: H ~ [r1 r2 t] up to scale.

use nalgebra::{DMatrix, Matrix3, Vector2};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("svd failed on the DLT system")]
    SvdFailed,
}

/// Estimate H such that `image ~ H * [X, Y, 1]` from point correspondences
/// using the DLT: stack two rows per correspondence into a 2n×9 homogeneous
/// system and take its null space from the SVD.
pub fn dlt_homography(
    object: &[Vector2<f64>],
    image: &[Vector2<f64>],
) -> Result<Matrix3<f64>, HomographyError> {
    let n = object.len();
    if n < 4 || image.len() != n {
        return Err(HomographyError::NotEnoughPoints(n.min(image.len())));
    }

    // At least 9 rows (zero-padded for n = 4): nalgebra's SVD is thin, and
    // with fewer rows than columns v_t would not carry the right singular
    // vector spanning the null space.
    let mut a = DMatrix::<f64>::zeros((2 * n).max(9), 9);
    for (i, (po, pi)) in object.iter().zip(image.iter()).enumerate() {
        let (x, y) = (po.x, po.y);
        let (u, v) = (pi.x, pi.y);
        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        // [X, Y, 1, 0, 0, 0, -uX, -uY, -u]
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        a[(r0, 8)] = -u;

        // [0, 0, 0, X, Y, 1, -vX, -vY, -v]
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        a[(r1, 8)] = -v;
    }

    let svd = a.svd(true, true);
    let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;

    // Right singular vector of the smallest singular value spans the null space.
    let mut min_idx = 0;
    for (i, s) in svd.singular_values.iter().enumerate() {
        if *s < svd.singular_values[min_idx] {
            min_idx = i;
        }
    }
    let h = v_t.row(min_idx);

    // Row-major reshape of the 9-vector.
    let mut h_mat = Matrix3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_mat[(r, c)] = h[3 * r + c];
        }
    }
    Ok(h_mat)
}
