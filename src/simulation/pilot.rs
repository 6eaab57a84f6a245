//! Scripted input source for headless runs
//!
//! Steers the player's kart around the track centerline so the core can be
//! exercised without an input device. Seeded jitter keeps runs reproducible
//! while still varying the line between seeds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::track::TrackLayout;
use super::types::{wrap_angle, KartInput};
use super::vehicle::VehicleState;

/// Steering per radian of heading error
const STEER_GAIN: f32 = 2.0;

/// Heading error above which the pilot holds drift
const DRIFT_HEADING_ERROR: f32 = 0.25;

/// Heading error below which the pilot is willing to boost
const BOOST_HEADING_ERROR: f32 = 0.1;

/// Follows centerline waypoints
#[derive(Debug, Clone)]
pub struct WaypointPilot {
    target: usize,
    reach_radius: f32,
    jitter: f32,
    boost_held: bool,
    rng: StdRng,
}

impl WaypointPilot {
    pub fn new(seed: u64, track: &TrackLayout) -> Self {
        Self {
            target: 1 % track.points().len(),
            reach_radius: 6.0,
            jitter: 0.05,
            boost_held: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Intent for the next fixed tick
    pub fn next_input(&mut self, state: &VehicleState, track: &TrackLayout) -> KartInput {
        if !state.control_enabled {
            self.boost_held = false;
            return KartInput::default();
        }

        let points = track.points();
        let position = state.pose.position;

        for _ in 0..points.len() {
            let target = points[self.target];
            let next = points[(self.target + 1) % points.len()];
            let distance = position.planar_distance(&target);
            if distance < self.reach_radius || position.planar_distance(&next) < distance {
                self.target = (self.target + 1) % points.len();
            } else {
                break;
            }
        }

        let desired = position.angle_to(&points[self.target]);
        let heading_error = wrap_angle(desired - state.pose.yaw);

        let mut steer = heading_error * STEER_GAIN;
        if self.jitter > 0.0 {
            steer += self.rng.random_range(-self.jitter..=self.jitter);
        }

        let wants_boost = state.stored_boosters > 0
            && !state.is_boosting
            && heading_error.abs() < BOOST_HEADING_ERROR;
        // The simulator expects a press edge, not a held button
        let boost_pressed = wants_boost && !self.boost_held;
        self.boost_held = wants_boost;

        KartInput::new(
            1.0,
            steer,
            heading_error.abs() > DRIFT_HEADING_ERROR,
            boost_pressed,
        )
    }
}
