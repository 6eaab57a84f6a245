//! Notifications emitted by the simulation core
//!
//! Every component appends `KartEvent`s to a caller-provided buffer in the
//! order they happen. The session hands the buffer to registered listeners
//! and returns it to the host. Listeners only ever see `&KartEvent`, so the
//! presentation layer cannot reach back into core state.

use log::debug;

use super::race::RaceState;

/// Something observable happened inside the core
#[derive(Debug, Clone, PartialEq)]
pub enum KartEvent {
    // Vehicle
    SpeedChanged(f32),
    DriftStarted { direction: i8 },
    DriftEnded,
    DriftChargeChanged(f32),
    BoosterCountChanged(u32),
    BoostStateChanged(bool),
    ControlChanged(bool),

    // Checkpoints
    CheckpointHit(usize),
    AllCheckpointsPassed,
    FinishCrossed { passed: usize, total: usize },

    // Race
    RaceStateChanged(RaceState),
    CountdownTick(u32),
    TimerUpdated { race_time: f32, lap_time: f32 },
    LapCompleted {
        current_lap: u32,
        total_laps: u32,
        lap_time: f32,
    },
    BestLapChanged(f32),
    /// Finish line crossed with gates still outstanding; the lap does not count
    FinishIgnored { missing_gates: usize },
    RaceFinished { total_time: f32 },
    MessageShown(String),
    MessageCleared,
}

/// Observer of core notifications
pub trait RaceListener {
    fn on_event(&mut self, event: &KartEvent);
}

impl<F> RaceListener for F
where
    F: FnMut(&KartEvent),
{
    fn on_event(&mut self, event: &KartEvent) {
        self(event)
    }
}

/// Handle returned on registration, used to deregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub usize);

/// Owns the registered listeners
///
/// Listeners live until they are removed or the registry is dropped.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, Box<dyn RaceListener>)>,
    next_id: usize,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn RaceListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        debug!("Registered listener {:?}", id);
        id
    }

    /// Remove a listener, handing ownership back to the caller
    pub fn deregister(&mut self, id: ListenerId) -> Option<Box<dyn RaceListener>> {
        let index = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        debug!("Deregistered listener {:?}", id);
        Some(self.listeners.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver events to every listener, in registration order
    pub fn dispatch(&mut self, events: &[KartEvent]) {
        for event in events {
            for (_, listener) in self.listeners.iter_mut() {
                listener.on_event(event);
            }
        }
    }
}
