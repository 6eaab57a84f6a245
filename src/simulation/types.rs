//! Core types for the kart simulation
//!
//! These are standalone types with no engine dependency.

use std::ops::{Add, AddAssign, Mul};

/// A 3D position (or direction) in the simulation
///
/// The ground plane is X/Z; Y is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ZERO: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance on the ground plane, ignoring height
    pub fn planar_distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Calculate the yaw from this position to another (Y-axis rotation)
    pub fn angle_to(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        let direction_len = (dx * dx + dz * dz).sqrt();
        if direction_len > 0.0 {
            (dx / direction_len).atan2(dz / direction_len)
        } else {
            0.0
        }
    }

    /// Closest point to `self` on the segment `start..end`, on the ground plane
    pub fn closest_on_segment(&self, start: &Position, end: &Position) -> Position {
        let dx = end.x - start.x;
        let dz = end.z - start.z;
        let len_sq = dx * dx + dz * dz;
        if len_sq <= f32::EPSILON {
            return *start;
        }
        let t = ((self.x - start.x) * dx + (self.z - start.z) * dz) / len_sq;
        start.lerp(end, t.clamp(0.0, 1.0))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Mul<f32> for Position {
    type Output = Position;

    fn mul(self, rhs: f32) -> Position {
        Position::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Wrap an angle in radians into [-π, π)
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

/// Rigid-body pose of a kart: position plus yaw in radians
///
/// Yaw 0 faces +Z, positive yaw turns right (towards +X).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Position,
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Position, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit vector the kart is facing
    pub fn forward(&self) -> Position {
        Position::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Unit vector to the kart's right
    pub fn right(&self) -> Position {
        Position::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

/// Input intent for a single fixed tick
///
/// `boost_pressed` is edge-triggered: the input source reports `true` only on
/// the tick the button went down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KartInput {
    pub throttle: f32,
    pub steer: f32,
    pub drift_held: bool,
    pub boost_pressed: bool,
}

impl KartInput {
    pub fn new(throttle: f32, steer: f32, drift_held: bool, boost_pressed: bool) -> Self {
        Self {
            throttle,
            steer,
            drift_held,
            boost_pressed,
        }
        .clamped()
    }

    /// Build an intent from discrete buttons (keyboard style devices)
    pub fn from_buttons(
        forward: bool,
        backward: bool,
        left: bool,
        right: bool,
        drift: bool,
        boost: bool,
    ) -> Self {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        Self {
            throttle: axis(forward, backward),
            steer: axis(right, left),
            drift_held: drift,
            boost_pressed: boost,
        }
    }

    /// Copy with both axes clamped to [-1, 1]; NaN axes read as released
    pub fn clamped(self) -> Self {
        let clamp_axis = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            throttle: clamp_axis(self.throttle),
            steer: clamp_axis(self.steer),
            ..self
        }
    }
}

/// Collision information gathered by the external physics layer for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionSignal {
    /// The kart touched something tagged as a wall this tick
    pub wall_hit: bool,
}

impl CollisionSignal {
    pub const NONE: CollisionSignal = CollisionSignal { wall_hit: false };
    pub const WALL: CollisionSignal = CollisionSignal { wall_hit: true };
}

/// A spatial trigger fired by the external trigger volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// A checkpoint gate with the given index was entered
    Gate(usize),
    /// The finish line was crossed
    Finish,
}
