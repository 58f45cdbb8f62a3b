//! System orchestration: configuration, messages, shared state, pipeline.

pub mod config;
pub mod messages;
pub mod pipeline;
pub mod shared_state;

pub use config::TrackerConfig;
pub use messages::{Detection, FrameInput, TrackerEvent};
pub use pipeline::TrackingPipeline;
pub use shared_state::{SharedState, TargetSnapshot};
