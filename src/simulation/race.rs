//! Race progression: countdown, lap counting and timing
//!
//! The state machine does not own the kart or the checkpoints. The caller
//! lends them in through `RaceLinks` on every call, and either may be
//! missing while a host is still being wired up. Missing links turn the
//! corresponding side effects into no-ops.

use anyhow::Result;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use sorted_vec::SortedVec;

use super::checkpoint::CheckpointTracker;
use super::clock::{format_time, Clock, ManualClock};
use super::config::RaceConfig;
use super::events::KartEvent;
use super::timer::{Scheduler, SequenceToken};
use super::vehicle::VehicleSimulator;

/// Phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaceState {
    Waiting,
    Countdown,
    Racing,
    Finished,
}

/// Everything the race knows about laps and times
#[derive(Debug, Clone)]
pub struct RaceProgress {
    pub state: RaceState,
    /// 0 before the start, 1-based once racing
    pub current_lap: u32,
    pub total_laps: u32,
    pub race_start_time: f64,
    pub current_lap_start_time: f64,
    /// Completed lap times, in the order they were driven
    pub lap_times: Vec<f32>,
    /// `f32::INFINITY` until a lap is completed
    pub best_lap_time: f32,
    pub race_time: f32,
    pub lap_time: f32,
    /// Last countdown value announced
    pub countdown_remaining: u32,
    /// Completed lap times, fastest first
    pub lap_ranking: SortedVec<OrderedFloat<f32>>,
    /// HUD message currently on screen
    pub message: Option<String>,
}

impl RaceProgress {
    pub fn new(total_laps: u32) -> Self {
        Self {
            state: RaceState::Waiting,
            current_lap: 0,
            total_laps,
            race_start_time: 0.0,
            current_lap_start_time: 0.0,
            lap_times: Vec::new(),
            best_lap_time: f32::INFINITY,
            race_time: 0.0,
            lap_time: 0.0,
            countdown_remaining: 0,
            lap_ranking: SortedVec::new(),
            message: None,
        }
    }

    pub fn best_lap(&self) -> Option<f32> {
        self.best_lap_time
            .is_finite()
            .then_some(self.best_lap_time)
    }

    pub fn completed_laps(&self) -> usize {
        self.lap_times.len()
    }
}

/// Collaborators lent to the state machine for the duration of one call
#[derive(Default)]
pub struct RaceLinks<'a> {
    pub simulator: Option<&'a mut VehicleSimulator>,
    pub checkpoints: Option<&'a mut CheckpointTracker>,
}

/// Deferred work owned by the race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RaceTimerEvent {
    Countdown(u32),
    Go,
    ClearMessage,
}

/// Drives a race from the starting grid to the finish
pub struct RaceStateMachine {
    config: RaceConfig,
    progress: RaceProgress,
    clock: Box<dyn Clock>,
    scheduler: Scheduler<RaceTimerEvent>,
    countdown_token: Option<SequenceToken>,
    message_token: Option<SequenceToken>,
}

impl RaceStateMachine {
    /// Create a race timed by a deterministic, frame-driven clock
    pub fn new(config: RaceConfig) -> Result<Self> {
        Self::with_clock(config, Box::new(ManualClock::new()))
    }

    pub fn with_clock(config: RaceConfig, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            progress: RaceProgress::new(config.total_laps),
            config,
            clock,
            scheduler: Scheduler::new(),
            countdown_token: None,
            message_token: None,
        })
    }

    pub fn progress(&self) -> &RaceProgress {
        &self.progress
    }

    pub fn state(&self) -> RaceState {
        self.progress.state
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of timed events still queued (countdown steps, message expiry)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Waiting -> Countdown
    pub fn start_race(&mut self, links: &mut RaceLinks<'_>, events: &mut Vec<KartEvent>) {
        if self.progress.state != RaceState::Waiting {
            warn!(
                "start_race ignored in state {:?}; use restart_race",
                self.progress.state
            );
            return;
        }

        match links.simulator.as_deref_mut() {
            Some(simulator) => {
                simulator.enable_control(false, events);
                let spawn = simulator.spawn_pose();
                simulator.reset_kart(spawn, events);
            }
            None => debug!("No simulator bound, skipping kart reset"),
        }

        self.set_state(RaceState::Countdown, events);

        let seconds = self.config.countdown_seconds;
        let now = self.clock.now();
        if seconds == 0 {
            self.begin_racing(now, links, events);
            return;
        }

        let token = self.scheduler.begin_sequence();
        for step in 1..seconds {
            self.scheduler
                .schedule(token, now + f64::from(step), RaceTimerEvent::Countdown(seconds - step));
        }
        self.scheduler
            .schedule(token, now + f64::from(seconds), RaceTimerEvent::Go);
        self.countdown_token = Some(token);

        self.progress.countdown_remaining = seconds;
        events.push(KartEvent::CountdownTick(seconds));
    }

    /// Abandon whatever is happening and go back to the grid, then count down again
    pub fn restart_race(&mut self, links: &mut RaceLinks<'_>, events: &mut Vec<KartEvent>) {
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            debug!("Restart cancelled {} pending timers", dropped);
        }
        self.countdown_token = None;
        self.message_token = None;

        let had_message = self.progress.message.is_some();
        let state = self.progress.state;
        self.progress = RaceProgress {
            state,
            ..RaceProgress::new(self.config.total_laps)
        };
        if had_message {
            events.push(KartEvent::MessageCleared);
        }

        match links.checkpoints.as_deref_mut() {
            Some(checkpoints) => checkpoints.reset(),
            None => debug!("No checkpoint tracker bound, nothing to reset"),
        }

        info!("Race restarted");
        self.set_state(RaceState::Waiting, events);
        self.start_race(links, events);
    }

    /// Advance the clock by one frame: fire due timers and refresh race timers
    pub fn on_frame_tick(
        &mut self,
        delta_secs: f32,
        links: &mut RaceLinks<'_>,
        events: &mut Vec<KartEvent>,
    ) {
        self.clock.advance(f64::from(delta_secs));
        let now = self.clock.now();

        for (token, due, timer_event) in self.scheduler.poll(now) {
            match timer_event {
                RaceTimerEvent::Countdown(remaining) => {
                    if self.is_live_countdown(token) {
                        self.progress.countdown_remaining = remaining;
                        events.push(KartEvent::CountdownTick(remaining));
                    }
                }
                RaceTimerEvent::Go => {
                    if self.is_live_countdown(token) {
                        // A long frame must not eat into the first lap
                        self.begin_racing(due, links, events);
                    }
                }
                RaceTimerEvent::ClearMessage => {
                    if self.message_token == Some(token) {
                        self.message_token = None;
                        self.progress.message = None;
                        events.push(KartEvent::MessageCleared);
                    }
                }
            }
        }

        if self.progress.state == RaceState::Racing {
            self.refresh_timers();
            events.push(KartEvent::TimerUpdated {
                race_time: self.progress.race_time,
                lap_time: self.progress.lap_time,
            });
        }
    }

    /// React to the finish line being crossed
    ///
    /// The lap counts only when every gate was passed; otherwise the crossing
    /// is reported and the race carries on unchanged.
    pub fn on_finish_crossed(
        &mut self,
        passed: usize,
        total: usize,
        links: &mut RaceLinks<'_>,
        events: &mut Vec<KartEvent>,
    ) {
        if self.progress.state != RaceState::Racing {
            debug!(
                "Finish crossed while {:?}, ignoring",
                self.progress.state
            );
            return;
        }

        self.refresh_timers();

        if passed < total {
            let missing_gates = total - passed;
            warn!(
                "Finish crossed with {} of {} checkpoints, lap not counted",
                passed, total
            );
            events.push(KartEvent::FinishIgnored { missing_gates });
            let plural = if missing_gates == 1 { "" } else { "s" };
            self.show_message(
                format!("Missed {} checkpoint{}!", missing_gates, plural),
                events,
            );
            return;
        }

        self.complete_lap(links, events);
    }

    fn complete_lap(&mut self, links: &mut RaceLinks<'_>, events: &mut Vec<KartEvent>) {
        let lap_time = self.progress.lap_time;
        self.progress.lap_times.push(lap_time);
        self.progress.lap_ranking.insert(OrderedFloat(lap_time));
        info!(
            "Lap {}/{} completed in {}",
            self.progress.current_lap,
            self.progress.total_laps,
            format_time(lap_time)
        );

        if lap_time < self.progress.best_lap_time {
            self.progress.best_lap_time = lap_time;
            events.push(KartEvent::BestLapChanged(lap_time));
        }

        if let Some(checkpoints) = links.checkpoints.as_deref_mut() {
            checkpoints.reset();
        }

        if self.progress.current_lap >= self.progress.total_laps {
            self.finish_race(links, events);
            return;
        }

        self.progress.current_lap += 1;
        self.progress.current_lap_start_time = self.clock.now();
        self.progress.lap_time = 0.0;
        events.push(KartEvent::LapCompleted {
            current_lap: self.progress.current_lap,
            total_laps: self.progress.total_laps,
            lap_time,
        });

        let message = if self.progress.current_lap == self.progress.total_laps {
            "Final Lap!".to_string()
        } else {
            format!(
                "Lap {}/{}",
                self.progress.current_lap, self.progress.total_laps
            )
        };
        self.show_message(message, events);
    }

    fn finish_race(&mut self, links: &mut RaceLinks<'_>, events: &mut Vec<KartEvent>) {
        self.set_state(RaceState::Finished, events);
        if let Some(simulator) = links.simulator.as_deref_mut() {
            simulator.enable_control(false, events);
        }
        let total_time = self.progress.race_time;
        info!("Race finished in {}", format_time(total_time));
        events.push(KartEvent::RaceFinished { total_time });
        self.show_message("FINISH!".to_string(), events);
    }

    /// Countdown -> Racing, with the clocks started at `start_time`
    fn begin_racing(
        &mut self,
        start_time: f64,
        links: &mut RaceLinks<'_>,
        events: &mut Vec<KartEvent>,
    ) {
        self.countdown_token = None;
        self.progress.countdown_remaining = 0;
        events.push(KartEvent::CountdownTick(0));

        // Gates touched on the grid do not count towards lap 1
        match links.checkpoints.as_deref_mut() {
            Some(checkpoints) => checkpoints.reset(),
            None => debug!("No checkpoint tracker bound, nothing to reset"),
        }

        self.progress.race_start_time = start_time;
        self.progress.current_lap_start_time = start_time;
        self.progress.current_lap = 1;
        self.progress.race_time = 0.0;
        self.progress.lap_time = 0.0;
        self.set_state(RaceState::Racing, events);

        match links.simulator.as_deref_mut() {
            Some(simulator) => simulator.enable_control(true, events),
            None => debug!("No simulator bound, nothing to enable"),
        }
        self.show_message("GO!".to_string(), events);
    }

    fn is_live_countdown(&self, token: SequenceToken) -> bool {
        self.progress.state == RaceState::Countdown && self.countdown_token == Some(token)
    }

    fn refresh_timers(&mut self) {
        let now = self.clock.now();
        self.progress.race_time = (now - self.progress.race_start_time) as f32;
        self.progress.lap_time = (now - self.progress.current_lap_start_time) as f32;
    }

    fn set_state(&mut self, state: RaceState, events: &mut Vec<KartEvent>) {
        if self.progress.state == state {
            return;
        }
        info!("Race state {:?} -> {:?}", self.progress.state, state);
        self.progress.state = state;
        events.push(KartEvent::RaceStateChanged(state));
    }

    /// Put a transient message on screen, replacing any current one
    fn show_message(&mut self, text: String, events: &mut Vec<KartEvent>) {
        if let Some(previous) = self.message_token.take() {
            self.scheduler.cancel(previous);
        }
        let token = self.scheduler.begin_sequence();
        let due = self.clock.now() + f64::from(self.config.message_duration);
        self.scheduler.schedule(token, due, RaceTimerEvent::ClearMessage);
        self.message_token = Some(token);

        self.progress.message = Some(text.clone());
        events.push(KartEvent::MessageShown(text));
    }
}
