//! Per-target lifecycle state machine.

/// Lifecycle state of a tracked target.
///
/// There is no `Lost` variant: once the miss threshold is reached the target
/// is evicted from the registry and a `TrackLost` event is emitted, so a
/// re-detection is indistinguishable from a first sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Seen this detection pass; pose updates are flowing.
    Tracking,
    /// Missed one or more consecutive passes; last pose stands, no events.
    Coasting,
}

impl Default for TargetState {
    fn default() -> Self {
        Self::Tracking
    }
}
