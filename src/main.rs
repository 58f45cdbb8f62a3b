//! Demo binary: drives the pipeline with a synthetic marker trajectory.
//!
//! Stands in for the real camera/detector collaborators: a square marker
//! orbits slowly in front of a fixed camera, its corners are projected
//! through the pinhole model, and the resulting detections feed the pipeline
//! at camera rate. Events are logged as they arrive.

use anyhow::Result;
use nalgebra::{Rotation3, Vector3};

use artracker::geometry::{marker_object_corners, CameraExtrinsics, CameraIntrinsics};
use artracker::system::{Detection, FrameInput, TrackerConfig, TrackerEvent, TrackingPipeline};

const FRAMES: u64 = 600;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = TrackerConfig {
        marker_half_size: 0.0125,
        detection_interval: 5,
        ..Default::default()
    };
    let half_size = config.marker_half_size;
    let intrinsics = CameraIntrinsics::new(1000.0, 1000.0, 500.0, 500.0);
    let (mut pipeline, events) = TrackingPipeline::new(config)?;

    let object = marker_object_corners(half_size);
    for i in 0..FRAMES {
        let t = i as f64 / 60.0;

        // Marker drifts on a small circle half a meter out, tilting gently.
        let rotation = Rotation3::from_euler_angles(0.2 * (0.7 * t).sin(), 0.2 * t.sin(), 0.0);
        let translation = Vector3::new(0.05 * t.cos(), 0.05 * t.sin(), 0.5);

        // The marker disappears for a stretch to exercise coasting and loss.
        let visible = !(300..460).contains(&i);
        let detections = if visible {
            let corners = object.map(|c| {
                let p_cam = rotation * Vector3::new(c.x, c.y, 0.0) + translation;
                intrinsics.project(&p_cam).expect("marker in front of camera")
            });
            vec![Detection {
                id: "demo-marker".to_string(),
                corners,
            }]
        } else {
            Vec::new()
        };

        pipeline.submit_frame(FrameInput {
            intrinsics,
            extrinsics: CameraExtrinsics::identity(),
            detections,
        });

        for event in events.try_iter() {
            match event {
                TrackerEvent::PoseUpdated { id, position, .. } => {
                    tracing::info!(%id, x = position.x, y = position.y, z = position.z, "pose")
                }
                TrackerEvent::TrackLost { id } => tracing::warn!(%id, "track lost"),
                TrackerEvent::DebugInfo { text } => tracing::debug!("{text}"),
            }
        }

        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    pipeline.shutdown();
    for event in events.try_iter() {
        if let TrackerEvent::TrackLost { id } = event {
            tracing::warn!(%id, "track lost");
        }
    }
    Ok(())
}
