//! Rolling-window pose smoother, one instance per tracked target.
//!
//! Positions are averaged arithmetically over a bounded FIFO. Orientations
//! are kept as unit quaternions in a second FIFO, sign-aligned on insertion
//! so that a quaternion and its negation (the same rotation) never straddle
//! the window, then folded with shortest-arc slerp into an approximate
//! running mean weighted toward recent samples.

use std::collections::VecDeque;

use nalgebra::{UnitQuaternion, Vector3};

/// Smoothed pose output for one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPose {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

/// Bounded-history smoother for one target's world-frame pose stream.
#[derive(Debug, Clone)]
pub struct PoseSmoother {
    positions: VecDeque<Vector3<f64>>,
    orientations: VecDeque<UnitQuaternion<f64>>,
    capacity: usize,
}

impl PoseSmoother {
    /// `capacity` is the window size N; both histories never exceed it.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: VecDeque::with_capacity(capacity),
            orientations: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Insert a raw pose sample and return the smoothed pose over the
    /// current window.
    pub fn push(&mut self, position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> SmoothedPose {
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);

        // Hemisphere-align against the newest stored sample so interpolation
        // never takes the long path around the 3-sphere.
        let aligned = match self.orientations.back() {
            Some(prev) => align_hemisphere(&rotation, prev),
            None => rotation,
        };
        if self.orientations.len() == self.capacity {
            self.orientations.pop_front();
        }
        self.orientations.push_back(aligned);

        SmoothedPose {
            position: self.mean_position(),
            rotation: self.mean_rotation(),
        }
    }

    /// Empty both histories. Called exactly when the owning target is lost.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.orientations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    fn mean_position(&self) -> Vector3<f64> {
        let sum = self
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p);
        sum / self.positions.len() as f64
    }

    /// Iterative slerp fold: start from the oldest sample, blend sample i in
    /// with weight 1/(i+1). An approximation of the mean rotation (not the
    /// eigen-decomposition mean), weighted toward recent samples.
    fn mean_rotation(&self) -> UnitQuaternion<f64> {
        let mut iter = self.orientations.iter();
        let mut avg = *iter.next().expect("push precedes mean");
        for (i, q) in iter.enumerate() {
            let aligned = align_hemisphere(q, &avg);
            let weight = 1.0 / (i + 2) as f64;
            avg = avg.slerp(&aligned, weight);
        }
        UnitQuaternion::new_normalize(avg.into_inner())
    }
}

/// Return `q` or `-q`, whichever lies in the same hemisphere as `reference`.
fn align_hemisphere(
    q: &UnitQuaternion<f64>,
    reference: &UnitQuaternion<f64>,
) -> UnitQuaternion<f64> {
    if q.coords.dot(&reference.coords) < 0.0 {
        UnitQuaternion::new_unchecked(-q.into_inner())
    } else {
        *q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quat(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(roll, pitch, yaw)
    }

    #[test]
    fn repeated_sample_converges_to_itself() {
        let mut s = PoseSmoother::new(5);
        let q = quat(0.3, -0.2, 0.5);
        let p = Vector3::new(0.1, 0.2, 0.3);
        let mut out = s.push(p, q);
        for _ in 0..4 {
            out = s.push(p, q);
        }
        assert!(out.rotation.angle_to(&q) < 1e-5);
        assert_relative_eq!(out.position.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(out.position.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(out.position.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn negated_quaternion_does_not_flip_output() {
        // q and -q are the same rotation; alternating them must keep the
        // visible output pinned to that rotation.
        let mut s = PoseSmoother::new(5);
        let q = quat(0.4, 0.1, -0.3);
        let neg = UnitQuaternion::new_unchecked(-q.into_inner());
        let p = Vector3::zeros();

        let mut out = s.push(p, q);
        for i in 0..6 {
            let sample = if i % 2 == 0 { neg } else { q };
            out = s.push(p, sample);
            assert!(
                out.rotation.angle_to(&q) < 1e-9,
                "output drifted at step {i}: angle {}",
                out.rotation.angle_to(&q)
            );
        }
    }

    #[test]
    fn position_is_window_mean() {
        let mut s = PoseSmoother::new(3);
        let q = UnitQuaternion::identity();
        s.push(Vector3::new(1.0, 0.0, 0.0), q);
        s.push(Vector3::new(2.0, 0.0, 0.0), q);
        let out = s.push(Vector3::new(3.0, 0.0, 0.0), q);
        assert_relative_eq!(out.position.x, 2.0, epsilon = 1e-12);

        // Overflow evicts the oldest sample.
        let out = s.push(Vector3::new(4.0, 0.0, 0.0), q);
        assert_relative_eq!(out.position.x, 3.0, epsilon = 1e-12);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn histories_never_exceed_capacity() {
        let mut s = PoseSmoother::new(5);
        for i in 0..20 {
            s.push(Vector3::new(i as f64, 0.0, 0.0), quat(0.01 * i as f64, 0.0, 0.0));
            assert!(s.len() <= 5);
        }
    }

    #[test]
    fn smoothing_lands_between_two_rotations() {
        let mut s = PoseSmoother::new(5);
        let a = quat(0.0, 0.0, 0.0);
        let b = quat(0.4, 0.0, 0.0);
        s.push(Vector3::zeros(), a);
        let out = s.push(Vector3::zeros(), b);
        let to_a = out.rotation.angle_to(&a);
        let to_b = out.rotation.angle_to(&b);
        assert!(to_a > 1e-6 && to_b > 1e-6, "output stuck at an endpoint");
        assert!(to_a + to_b <= a.angle_to(&b) + 1e-9);
    }

    #[test]
    fn reset_empties_histories() {
        let mut s = PoseSmoother::new(5);
        s.push(Vector3::new(1.0, 2.0, 3.0), quat(0.2, 0.0, 0.0));
        assert!(!s.is_empty());
        s.reset();
        assert!(s.is_empty());

        // Fresh after reset: first sample dominates entirely.
        let out = s.push(Vector3::new(9.0, 0.0, 0.0), quat(0.0, 0.5, 0.0));
        assert_relative_eq!(out.position.x, 9.0, epsilon = 1e-12);
        assert!(out.rotation.angle_to(&quat(0.0, 0.5, 0.0)) < 1e-12);
    }
}
