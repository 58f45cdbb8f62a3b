//! Temporal tracking: per-target smoothing, lifecycle, and the registry.

pub mod registry;
pub mod smoother;
pub mod state;

pub use registry::TrackRegistry;
pub use smoother::{PoseSmoother, SmoothedPose};
pub use state::TargetState;
