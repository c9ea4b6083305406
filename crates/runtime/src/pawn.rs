//! The entity a reference tree drives.

use std::time::Duration;

use behavior_tree::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A simulated agent body on a plane.
///
/// Units move it, turn it, and read the frame delta through
/// [`UnitContext::target`](behavior_tree::UnitContext::target).
#[derive(Debug, Clone)]
pub struct Pawn {
    name: String,
    position: Vec3,
    heading_deg: f32,
    frame: u64,
    frame_delta: Duration,
    rng: StdRng,
}

impl Pawn {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rng(name, StdRng::from_entropy())
    }

    /// Pawn whose random draws are reproducible.
    pub fn seeded(name: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(name, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: impl Into<String>, rng: StdRng) -> Self {
        Self {
            name: name.into(),
            position: [0.0; 3],
            heading_deg: 0.0,
            frame: 0,
            frame_delta: Duration::ZERO,
            rng,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading in degrees, in `[0, 360)`.
    pub fn heading_deg(&self) -> f32 {
        self.heading_deg
    }

    /// Frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Length of the current frame in seconds.
    pub fn delta_secs(&self) -> f32 {
        self.frame_delta.as_secs_f32()
    }

    pub fn translate(&mut self, offset: Vec3) {
        for (axis, delta) in self.position.iter_mut().zip(offset) {
            *axis += delta;
        }
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.heading_deg = (self.heading_deg + degrees).rem_euclid(360.0);
    }

    /// Uniform draw in `[min, max)`; `min` when the range is empty.
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    pub(crate) fn begin_frame(&mut self, dt: Duration) {
        self.frame += 1;
        self.frame_delta = dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps() {
        let mut pawn = Pawn::seeded("p", 1);
        pawn.rotate(350.0);
        pawn.rotate(20.0);
        assert!((pawn.heading_deg() - 10.0).abs() < 1e-4);

        pawn.rotate(-30.0);
        assert!((pawn.heading_deg() - 340.0).abs() < 1e-4);
    }

    #[test]
    fn random_range_handles_empty_range() {
        let mut pawn = Pawn::seeded("p", 1);
        assert_eq!(pawn.random_range(2.0, 2.0), 2.0);
        assert_eq!(pawn.random_range(3.0, 1.0), 3.0);

        let draw = pawn.random_range(1.0, 2.0);
        assert!((1.0..2.0).contains(&draw));
    }

    #[test]
    fn frames_advance() {
        let mut pawn = Pawn::seeded("p", 1).at([1.0, 2.0, 0.0]);
        pawn.begin_frame(Duration::from_millis(50));
        pawn.translate([0.5, -1.0, 0.0]);

        assert_eq!(pawn.frame(), 1);
        assert!((pawn.delta_secs() - 0.05).abs() < 1e-6);
        assert_eq!(pawn.position(), [1.5, 1.0, 0.0]);
    }
}
