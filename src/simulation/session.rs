//! Host-facing entry point that ties the kart and the race together
//!
//! A host drives the session with three calls: `on_fixed_tick` once per
//! physics step, `on_frame_tick` once per rendered frame and
//! `on_trigger_event` whenever a trigger volume fires. Every call returns the
//! notifications it produced, after they were handed to the registered
//! listeners.

use anyhow::{Context, Result};
use log::{debug, info};

use super::checkpoint::CheckpointTracker;
use super::clock::{format_time, Clock};
use super::config::{KartConfig, RaceConfig};
use super::events::{KartEvent, ListenerId, ListenerRegistry, RaceListener};
use super::race::{RaceLinks, RaceProgress, RaceState, RaceStateMachine};
use super::types::{CollisionSignal, KartInput, Pose, TriggerEvent};
use super::vehicle::{VehicleSimulator, VehicleState};

/// Owns one kart, its checkpoints and the race around them
pub struct RaceSession {
    simulator: Option<VehicleSimulator>,
    checkpoints: Option<CheckpointTracker>,
    race: RaceStateMachine,
    listeners: ListenerRegistry,
    /// Total simulated physics time
    pub physics_time: f32,
    /// Fixed ticks processed so far
    pub fixed_ticks: u64,
}

impl RaceSession {
    /// Fully wired session with `gate_count` ordinary gates plus a finish line
    pub fn new(
        kart_config: KartConfig,
        race_config: RaceConfig,
        gate_count: usize,
        spawn_pose: Pose,
    ) -> Result<Self> {
        kart_config
            .validate()
            .context("Invalid kart configuration")?;
        let mut session = Self::unwired(race_config)?;
        session.bind_simulator(VehicleSimulator::new(kart_config, spawn_pose));
        session.bind_checkpoints(CheckpointTracker::with_gate_count(gate_count));
        Ok(session)
    }

    /// Session with no kart and no checkpoints yet
    pub fn unwired(race_config: RaceConfig) -> Result<Self> {
        let race = RaceStateMachine::new(race_config).context("Invalid race configuration")?;
        Ok(Self::from_race(race))
    }

    /// Session using a caller-provided time source
    pub fn unwired_with_clock(race_config: RaceConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let race = RaceStateMachine::with_clock(race_config, clock)
            .context("Invalid race configuration")?;
        Ok(Self::from_race(race))
    }

    fn from_race(race: RaceStateMachine) -> Self {
        Self {
            simulator: None,
            checkpoints: None,
            race,
            listeners: ListenerRegistry::new(),
            physics_time: 0.0,
            fixed_ticks: 0,
        }
    }

    pub fn bind_simulator(&mut self, simulator: VehicleSimulator) -> Option<VehicleSimulator> {
        self.simulator.replace(simulator)
    }

    pub fn bind_checkpoints(&mut self, checkpoints: CheckpointTracker) -> Option<CheckpointTracker> {
        self.checkpoints.replace(checkpoints)
    }

    pub fn add_listener(&mut self, listener: Box<dyn RaceListener>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn RaceListener>> {
        self.listeners.deregister(id)
    }

    pub fn vehicle(&self) -> Option<&VehicleState> {
        self.simulator.as_ref().map(VehicleSimulator::state)
    }

    pub fn simulator(&self) -> Option<&VehicleSimulator> {
        self.simulator.as_ref()
    }

    pub fn checkpoints(&self) -> Option<&CheckpointTracker> {
        self.checkpoints.as_ref()
    }

    pub fn race(&self) -> &RaceStateMachine {
        &self.race
    }

    pub fn progress(&self) -> &RaceProgress {
        self.race.progress()
    }

    pub fn state(&self) -> RaceState {
        self.race.state()
    }

    pub fn start_race(&mut self) -> Vec<KartEvent> {
        let mut events = Vec::new();
        let mut links = RaceLinks {
            simulator: self.simulator.as_mut(),
            checkpoints: self.checkpoints.as_mut(),
        };
        self.race.start_race(&mut links, &mut events);
        self.publish(events)
    }

    pub fn restart_race(&mut self) -> Vec<KartEvent> {
        let mut events = Vec::new();
        let mut links = RaceLinks {
            simulator: self.simulator.as_mut(),
            checkpoints: self.checkpoints.as_mut(),
        };
        self.race.restart_race(&mut links, &mut events);
        self.publish(events)
    }

    /// One physics step for the kart
    pub fn on_fixed_tick(
        &mut self,
        delta_secs: f32,
        input: KartInput,
        collision: CollisionSignal,
    ) -> Vec<KartEvent> {
        let mut events = Vec::new();
        self.physics_time += delta_secs;
        self.fixed_ticks += 1;

        match self.simulator.as_mut() {
            Some(simulator) => simulator.on_fixed_tick(input, delta_secs, collision, &mut events),
            None => debug!("Fixed tick with no simulator bound"),
        }
        self.publish(events)
    }

    /// One presentation frame: advances race time and timed sequences
    pub fn on_frame_tick(&mut self, delta_secs: f32) -> Vec<KartEvent> {
        let mut events = Vec::new();
        let mut links = RaceLinks {
            simulator: self.simulator.as_mut(),
            checkpoints: self.checkpoints.as_mut(),
        };
        self.race.on_frame_tick(delta_secs, &mut links, &mut events);
        self.publish(events)
    }

    /// A trigger volume fired
    pub fn on_trigger_event(&mut self, trigger: TriggerEvent) -> Vec<KartEvent> {
        let mut events = Vec::new();

        let Some(checkpoints) = self.checkpoints.as_mut() else {
            debug!("Trigger {:?} with no checkpoint tracker bound", trigger);
            return events;
        };

        match trigger {
            TriggerEvent::Gate(index) => checkpoints.on_gate_triggered(index, &mut events),
            TriggerEvent::Finish => checkpoints.on_finish_triggered(&mut events),
        }

        let crossings: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|event| match event {
                KartEvent::FinishCrossed { passed, total } => Some((*passed, *total)),
                _ => None,
            })
            .collect();

        for (passed, total) in crossings {
            let mut links = RaceLinks {
                simulator: self.simulator.as_mut(),
                checkpoints: self.checkpoints.as_mut(),
            };
            self.race
                .on_finish_crossed(passed, total, &mut links, &mut events);
        }

        self.publish(events)
    }

    fn publish(&mut self, events: Vec<KartEvent>) -> Vec<KartEvent> {
        self.listeners.dispatch(&events);
        events
    }

    /// Log a summary of the race so far
    pub fn print_summary(&self) {
        let progress = self.progress();
        info!("=== Race Summary ===");
        info!("State: {:?}", progress.state);
        info!(
            "Lap: {}/{} ({} completed)",
            progress.current_lap,
            progress.total_laps,
            progress.completed_laps()
        );
        info!("Total time: {}", format_time(progress.race_time));
        for (i, lap) in progress.lap_times.iter().enumerate() {
            info!("  Lap {}: {}", i + 1, format_time(*lap));
        }
        match progress.best_lap() {
            Some(best) => info!("Best lap: {}", format_time(best)),
            None => info!("Best lap: --:--.---"),
        }
        if !progress.lap_ranking.is_empty() {
            let ranking: Vec<String> = progress
                .lap_ranking
                .iter()
                .map(|lap| format_time(lap.into_inner()))
                .collect();
            info!("Lap ranking: {}", ranking.join(", "));
        }

        if let Some(state) = self.vehicle() {
            info!(
                "Kart: speed={:.1}, position=({:.1}, {:.1}), boosters={}, charge={:.0}%",
                state.speed,
                state.pose.position.x,
                state.pose.position.z,
                state.stored_boosters,
                state.drift_charge_percent
            );
        }
        if let Some(checkpoints) = self.checkpoints() {
            info!(
                "Checkpoints this lap: {}/{}",
                checkpoints.passed_count(),
                checkpoints.total_gates()
            );
        }
        info!("Physics ticks: {} ({:.2}s)", self.fixed_ticks, self.physics_time);
    }
}
