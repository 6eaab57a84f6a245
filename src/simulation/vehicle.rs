//! Kart motion, drift and boost model
//!
//! Standalone implementation that doesn't depend on any engine. The
//! simulator is the only writer of `VehicleState`; everything else reads a
//! copy.

use log::debug;

use super::config::KartConfig;
use super::events::KartEvent;
use super::types::{wrap_angle, CollisionSignal, KartInput, Pose, Position};

/// Steering deflection needed before a drift can start or continue
pub const DRIFT_STEER_THRESHOLD: f32 = 0.1;

/// Sideways slide while drifting, as a fraction of speed
pub const DRIFT_LATERAL_FACTOR: f32 = 0.3;

/// Below this speed magnitude steering has no effect
pub const MIN_SPEED_TO_STEER: f32 = 0.5;

/// Fraction of speed kept after hitting a wall
pub const WALL_SPEED_RETENTION: f32 = 0.3;

/// Charge needed to fill one booster slot
pub const FULL_DRIFT_CHARGE: f32 = 100.0;

/// Leftover boost time, as a fraction of the tick, that still counts as expired
const BOOST_EXPIRY_TOLERANCE: f32 = 1e-3;

/// Snapshot of a kart's continuous state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub pose: Pose,
    /// World velocity; `y` belongs to the external gravity resolver and is kept as is
    pub velocity: Position,
    /// Signed speed along the facing direction, negative when reversing
    pub speed: f32,
    pub steering_input: f32,
    pub is_drifting: bool,
    /// -1 left, 1 right, 0 when not drifting
    pub drift_direction: i8,
    pub drift_charge_percent: f32,
    pub stored_boosters: u32,
    pub is_boosting: bool,
    pub boost_time_remaining: f32,
    pub control_enabled: bool,
}

impl VehicleState {
    pub fn at_pose(pose: Pose) -> Self {
        Self {
            pose,
            velocity: Position::ZERO,
            speed: 0.0,
            steering_input: 0.0,
            is_drifting: false,
            drift_direction: 0,
            drift_charge_percent: 0.0,
            stored_boosters: 0,
            is_boosting: false,
            boost_time_remaining: 0.0,
            control_enabled: false,
        }
    }
}

/// Advances a single kart every fixed tick
#[derive(Debug, Clone)]
pub struct VehicleSimulator {
    config: KartConfig,
    state: VehicleState,
    spawn_pose: Pose,
    /// Last speed reported through `SpeedChanged`
    reported_speed: f32,
}

impl VehicleSimulator {
    /// Create a simulator at the given spawn pose, with control disabled
    pub fn new(config: KartConfig, spawn_pose: Pose) -> Self {
        Self {
            config,
            state: VehicleState::at_pose(spawn_pose),
            spawn_pose,
            reported_speed: 0.0,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn config(&self) -> &KartConfig {
        &self.config
    }

    pub fn spawn_pose(&self) -> Pose {
        self.spawn_pose
    }

    pub fn set_spawn_pose(&mut self, pose: Pose) {
        self.spawn_pose = pose;
    }

    pub fn is_control_enabled(&self) -> bool {
        self.state.control_enabled
    }

    /// Top speed right now, including boost
    pub fn effective_max_speed(&self) -> f32 {
        if self.state.is_boosting {
            self.config.max_speed * self.config.boost_speed_multiplier
        } else {
            self.config.max_speed
        }
    }

    /// Advance the kart by one fixed tick
    pub fn on_fixed_tick(
        &mut self,
        input: KartInput,
        delta_secs: f32,
        collision: CollisionSignal,
        events: &mut Vec<KartEvent>,
    ) {
        let input = input.clamped();

        if self.state.control_enabled {
            self.state.steering_input = input.steer;
            self.update_speed(input.throttle, delta_secs);
            self.update_drift(&input, delta_secs, events);
            self.update_boost_timer(delta_secs, events);
            if input.boost_pressed {
                self.try_activate_boost(events);
            }
            self.integrate_motion(delta_secs);
            self.integrate_steering(input.steer, delta_secs);
            if input.throttle == 0.0 && input.steer == 0.0 {
                self.apply_friction(delta_secs);
            }
        } else {
            self.state.steering_input = 0.0;
            self.update_boost_timer(delta_secs, events);
        }

        if collision.wall_hit {
            self.on_wall_hit(events);
        }

        self.report_speed(events);
    }

    fn update_speed(&mut self, throttle: f32, delta_secs: f32) {
        let cfg = &self.config;
        let max = self.effective_max_speed();
        let speed = &mut self.state.speed;

        if throttle > 0.0 {
            *speed = (*speed + cfg.acceleration * delta_secs).min(max);
        } else if throttle < 0.0 {
            if *speed > 0.0 {
                *speed = (*speed - cfg.brake_force * delta_secs).max(0.0);
            } else {
                *speed = (*speed - 0.5 * cfg.acceleration * delta_secs).max(-cfg.reverse_speed);
            }
        }

        *speed = speed.clamp(-cfg.reverse_speed, max);
    }

    fn update_drift(&mut self, input: &KartInput, delta_secs: f32, events: &mut Vec<KartEvent>) {
        let eligible = self.state.speed >= self.config.min_speed_to_drift
            && input.steer.abs() > DRIFT_STEER_THRESHOLD;

        if self.state.is_drifting {
            if !input.drift_held || !eligible {
                self.end_drift(events);
                return;
            }
        } else if input.drift_held && eligible {
            self.state.is_drifting = true;
            self.state.drift_direction = if input.steer > 0.0 { 1 } else { -1 };
            debug!("Drift started, direction {}", self.state.drift_direction);
            events.push(KartEvent::DriftStarted {
                direction: self.state.drift_direction,
            });
        } else {
            return;
        }

        if self.state.stored_boosters >= self.config.max_booster_slots {
            return;
        }

        self.state.drift_charge_percent += self.config.drift_charge_rate * delta_secs;
        if self.state.drift_charge_percent >= FULL_DRIFT_CHARGE {
            self.state.stored_boosters += 1;
            self.state.drift_charge_percent = 0.0;
            debug!("Booster slot filled, {} stored", self.state.stored_boosters);
            events.push(KartEvent::BoosterCountChanged(self.state.stored_boosters));
        }
        events.push(KartEvent::DriftChargeChanged(
            self.state.drift_charge_percent,
        ));
    }

    /// Stop drifting; the accumulated charge is kept
    fn end_drift(&mut self, events: &mut Vec<KartEvent>) {
        if !self.state.is_drifting {
            return;
        }
        self.state.is_drifting = false;
        self.state.drift_direction = 0;
        debug!(
            "Drift ended with {:.1}% charge",
            self.state.drift_charge_percent
        );
        events.push(KartEvent::DriftEnded);
    }

    fn update_boost_timer(&mut self, delta_secs: f32, events: &mut Vec<KartEvent>) {
        if !self.state.is_boosting {
            return;
        }
        self.state.boost_time_remaining -= delta_secs;
        // Repeated f32 subtraction leaves a rounding remainder behind
        if self.state.boost_time_remaining <= delta_secs * BOOST_EXPIRY_TOLERANCE {
            self.stop_boost(events);
        }
    }

    fn try_activate_boost(&mut self, events: &mut Vec<KartEvent>) {
        if self.state.stored_boosters == 0 || self.state.is_boosting {
            return;
        }
        self.state.stored_boosters -= 1;
        self.state.is_boosting = true;
        self.state.boost_time_remaining = self.config.boost_duration;
        debug!("Boost activated, {} boosters left", self.state.stored_boosters);
        events.push(KartEvent::BoosterCountChanged(self.state.stored_boosters));
        events.push(KartEvent::BoostStateChanged(true));
    }

    fn stop_boost(&mut self, events: &mut Vec<KartEvent>) {
        self.state.is_boosting = false;
        self.state.boost_time_remaining = 0.0;
        events.push(KartEvent::BoostStateChanged(false));
    }

    fn integrate_motion(&mut self, delta_secs: f32) {
        let speed = self.state.speed;
        let mut planar = self.state.pose.forward() * speed;

        // The drag scales the whole vector, forward part included
        if self.state.is_drifting {
            let slide = DRIFT_LATERAL_FACTOR * f32::from(self.state.drift_direction) * speed;
            planar = (planar + self.state.pose.right() * slide) * self.config.drift_drag;
        }

        self.state.velocity = Position::new(planar.x, self.state.velocity.y, planar.z);
        self.state.pose.position += self.state.velocity * delta_secs;
    }

    fn integrate_steering(&mut self, steer: f32, delta_secs: f32) {
        let speed = self.state.speed;
        if speed.abs() < MIN_SPEED_TO_STEER {
            return;
        }

        let drift_scale = if self.state.is_drifting {
            self.config.drift_turn_multiplier
        } else {
            1.0
        };
        let speed_factor = (speed.abs() / self.config.max_speed).clamp(0.0, 1.0);
        let mut turn = steer * self.config.turn_speed * drift_scale * speed_factor * delta_secs;
        if speed < 0.0 {
            turn = -turn;
        }
        self.state.pose.yaw = wrap_angle(self.state.pose.yaw + turn);
    }

    fn apply_friction(&mut self, delta_secs: f32) {
        let decay = self.config.friction * delta_secs;
        let speed = &mut self.state.speed;
        if *speed > 0.0 {
            *speed = (*speed - decay).max(0.0);
        } else if *speed < 0.0 {
            *speed = (*speed + decay).min(0.0);
        }
    }

    fn on_wall_hit(&mut self, events: &mut Vec<KartEvent>) {
        self.state.speed *= WALL_SPEED_RETENTION;
        if self.state.is_boosting {
            debug!("Wall hit cancelled boost");
            self.stop_boost(events);
        }
    }

    fn report_speed(&mut self, events: &mut Vec<KartEvent>) {
        if self.state.speed != self.reported_speed {
            self.reported_speed = self.state.speed;
            events.push(KartEvent::SpeedChanged(self.state.speed));
        }
    }

    /// Toggle player control; disabling stops the kart and ends any drift
    pub fn enable_control(&mut self, enabled: bool, events: &mut Vec<KartEvent>) {
        self.state.control_enabled = enabled;
        if !enabled {
            self.state.speed = 0.0;
            self.state.velocity = Position::new(0.0, self.state.velocity.y, 0.0);
            self.state.steering_input = 0.0;
            self.end_drift(events);
            self.report_speed(events);
        }
        events.push(KartEvent::ControlChanged(enabled));
    }

    /// Full reset: new pose, no motion, no charge, no boosters
    ///
    /// Control enablement is left as it was.
    pub fn reset_kart(&mut self, pose: Pose, events: &mut Vec<KartEvent>) {
        let control_enabled = self.state.control_enabled;
        self.state = VehicleState {
            control_enabled,
            ..VehicleState::at_pose(pose)
        };
        events.push(KartEvent::DriftChargeChanged(0.0));
        events.push(KartEvent::BoosterCountChanged(0));
        events.push(KartEvent::BoostStateChanged(false));
        self.report_speed(events);
    }
}
