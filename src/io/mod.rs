//! Adapters for external collaborators' data.

pub mod detections;

pub use detections::{adapt_detection, relabel_corners, RawDetection};
