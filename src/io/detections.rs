//! Adapter for the external symbol detector's output.
//!
//! The upstream detector hands back four labeled corners per symbol, but its
//! labels swap "top-right" and "bottom-left" relative to true geometric
//! order. The fixed permutation here compensates for that one library's
//! defect; paired with a different detection source, the ordering must be
//! re-verified empirically rather than assumed.

use nalgebra::Vector2;

use crate::system::messages::Detection;

/// One symbol as reported by the external detector, corners in the
/// library's (defective) labeling order: TL, TR, BR, BL by name.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub id: String,
    pub corners: [Vector2<f64>; 4],
}

/// Relabel the detector's corners into true geometric order:
/// `(trueTL, trueTR, trueBR, trueBL) = (libTL, libBL, libBR, libTR)`.
pub fn relabel_corners(lib: &[Vector2<f64>; 4]) -> [Vector2<f64>; 4] {
    [lib[0], lib[3], lib[2], lib[1]]
}

/// Convert a raw detector symbol into a core `Detection`.
pub fn adapt_detection(raw: RawDetection) -> Detection {
    Detection {
        id: raw.id,
        corners: relabel_corners(&raw.corners),
    }
}
