//! Tunable constants for the kart and the race
//!
//! Defaults are the tuned values used by the headless host. Both structs are
//! validated once at startup; a bad configuration is a setup error, never an
//! in-race failure.

use anyhow::{bail, Result};

/// Default number of booster slots a kart can hold
pub const DEFAULT_MAX_BOOSTER_SLOTS: u32 = 2;

/// Default number of laps in a race
pub const DEFAULT_TOTAL_LAPS: u32 = 3;

/// Default countdown before the race starts, in seconds
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 3;

/// Physics tuning for a single kart
#[derive(Debug, Clone, PartialEq)]
pub struct KartConfig {
    /// Top speed without boost (units/s)
    pub max_speed: f32,
    /// Throttle acceleration (units/s²)
    pub acceleration: f32,
    /// Deceleration while braking from forward motion (units/s²)
    pub brake_force: f32,
    /// Top reverse speed, as a positive magnitude (units/s)
    pub reverse_speed: f32,
    /// Coasting deceleration when no pedal and no steering (units/s²)
    pub friction: f32,
    /// Yaw rate at full steer and full speed (rad/s)
    pub turn_speed: f32,
    /// Turn rate multiplier while drifting
    pub drift_turn_multiplier: f32,
    /// Velocity scale applied every tick while drifting, in (0, 1]
    pub drift_drag: f32,
    /// Drift charge gained per second of drifting (percent/s)
    pub drift_charge_rate: f32,
    /// Minimum forward speed for a drift to start or continue
    pub min_speed_to_drift: f32,
    /// Top speed multiplier while boosting
    pub boost_speed_multiplier: f32,
    /// Length of one boost (s)
    pub boost_duration: f32,
    /// Number of boosters that can be stored
    pub max_booster_slots: u32,
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            max_speed: 20.0,
            acceleration: 10.0,
            brake_force: 20.0,
            reverse_speed: 8.0,
            friction: 5.0,
            turn_speed: 1.75,
            drift_turn_multiplier: 1.5,
            drift_drag: 0.98,
            drift_charge_rate: 40.0,
            min_speed_to_drift: 8.0,
            boost_speed_multiplier: 1.5,
            boost_duration: 1.5,
            max_booster_slots: DEFAULT_MAX_BOOSTER_SLOTS,
        }
    }
}

impl KartConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_speed.is_nan() || self.max_speed <= 0.0 {
            bail!("max_speed must be positive, got {}", self.max_speed);
        }
        if self.reverse_speed < 0.0 {
            bail!("reverse_speed must not be negative, got {}", self.reverse_speed);
        }
        if self.drift_drag.is_nan() || self.drift_drag <= 0.0 || self.drift_drag > 1.0 {
            bail!("drift_drag must be in (0, 1], got {}", self.drift_drag);
        }
        if self.boost_speed_multiplier < 1.0 {
            bail!(
                "boost_speed_multiplier must be at least 1, got {}",
                self.boost_speed_multiplier
            );
        }
        if self.max_booster_slots == 0 {
            bail!("max_booster_slots must be at least 1");
        }
        let rates = [
            ("acceleration", self.acceleration),
            ("brake_force", self.brake_force),
            ("friction", self.friction),
            ("turn_speed", self.turn_speed),
            ("drift_charge_rate", self.drift_charge_rate),
            ("boost_duration", self.boost_duration),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must be a finite non-negative number, got {}", name, value);
            }
        }
        Ok(())
    }
}

/// Rules of a single race
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    pub total_laps: u32,
    /// Whole seconds counted down before control is enabled
    pub countdown_seconds: u32,
    /// How long transient HUD messages stay up (s)
    pub message_duration: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            total_laps: DEFAULT_TOTAL_LAPS,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            message_duration: 2.0,
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_laps == 0 {
            bail!("total_laps must be at least 1");
        }
        if self.message_duration.is_nan() || self.message_duration < 0.0 {
            bail!(
                "message_duration must not be negative, got {}",
                self.message_duration
            );
        }
        Ok(())
    }
}
