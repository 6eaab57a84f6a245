//! Standalone kart racing simulation module
//!
//! This module contains the deterministic core: kart physics, checkpoint
//! gating and race progression. It runs independently of any renderer or
//! engine and can be driven from the console for testing.

mod checkpoint;
mod clock;
mod config;
mod events;
mod pilot;
mod race;
mod session;
mod timer;
mod track;
mod types;
mod vehicle;

pub use checkpoint::{CheckpointGate, CheckpointTracker};
pub use clock::{format_time, Clock, ManualClock, SystemClock};
pub use config::{
    KartConfig, RaceConfig, DEFAULT_COUNTDOWN_SECONDS, DEFAULT_MAX_BOOSTER_SLOTS,
    DEFAULT_TOTAL_LAPS,
};
pub use events::{KartEvent, ListenerId, ListenerRegistry, RaceListener};
pub use pilot::WaypointPilot;
pub use race::{RaceLinks, RaceProgress, RaceState, RaceStateMachine};
pub use session::RaceSession;
pub use timer::{Scheduler, SequenceToken};
pub use track::TrackLayout;
pub use types::{wrap_angle, CollisionSignal, KartInput, Pose, Position, TriggerEvent};
pub use vehicle::{
    VehicleSimulator, VehicleState, DRIFT_LATERAL_FACTOR, DRIFT_STEER_THRESHOLD,
    FULL_DRIFT_CHARGE, MIN_SPEED_TO_STEER, WALL_SPEED_RETENTION,
};
