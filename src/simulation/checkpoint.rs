//! Checkpoint gating for lap validation
//!
//! The tracker only records which gates were crossed this lap and reports
//! finish-line crossings. Whether a crossing completes a lap is decided by
//! the race state machine.

use anyhow::{bail, Result};
use log::{debug, warn};
use std::collections::HashSet;

use super::events::KartEvent;

/// A checkpoint trigger, created once when the track is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointGate {
    pub index: usize,
    pub is_finish_line: bool,
    pub has_passed_this_lap: bool,
}

impl CheckpointGate {
    pub fn checkpoint(index: usize) -> Self {
        Self {
            index,
            is_finish_line: false,
            has_passed_this_lap: false,
        }
    }

    pub fn finish_line(index: usize) -> Self {
        Self {
            index,
            is_finish_line: true,
            has_passed_this_lap: false,
        }
    }
}

/// Tracks which gates have been passed during the current lap
#[derive(Debug, Clone)]
pub struct CheckpointTracker {
    /// Non-finish gates, sorted by index
    gates: Vec<CheckpointGate>,
    finish: CheckpointGate,
    passed: HashSet<usize>,
}

impl CheckpointTracker {
    /// `count` ordinary gates indexed `0..count`, finish line at index `count`
    pub fn with_gate_count(count: usize) -> Self {
        Self {
            gates: (0..count).map(CheckpointGate::checkpoint).collect(),
            finish: CheckpointGate::finish_line(count),
            passed: HashSet::new(),
        }
    }

    /// Build from an explicit gate list containing exactly one finish line
    pub fn from_gates(gates: Vec<CheckpointGate>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut finish = None;
        let mut checkpoints = Vec::with_capacity(gates.len());

        for gate in gates {
            if !seen.insert(gate.index) {
                bail!("Duplicate gate index {}", gate.index);
            }
            let gate = CheckpointGate {
                has_passed_this_lap: false,
                ..gate
            };
            if gate.is_finish_line {
                if finish.is_some() {
                    bail!("More than one finish line (second at index {})", gate.index);
                }
                finish = Some(gate);
            } else {
                checkpoints.push(gate);
            }
        }

        let Some(finish) = finish else {
            bail!("Gate list has no finish line");
        };
        checkpoints.sort_by_key(|g| g.index);

        Ok(Self {
            gates: checkpoints,
            finish,
            passed: HashSet::new(),
        })
    }

    pub fn gates(&self) -> &[CheckpointGate] {
        &self.gates
    }

    pub fn finish_gate(&self) -> &CheckpointGate {
        &self.finish
    }

    pub fn total_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn passed_count(&self) -> usize {
        self.passed.len()
    }

    pub fn missing_gates(&self) -> usize {
        self.total_gates().saturating_sub(self.passed_count())
    }

    pub fn all_passed(&self) -> bool {
        self.passed_count() >= self.total_gates()
    }

    pub fn has_passed(&self, index: usize) -> bool {
        self.passed.contains(&index)
    }

    /// A gate trigger volume was entered
    pub fn on_gate_triggered(&mut self, index: usize, events: &mut Vec<KartEvent>) {
        if index == self.finish.index {
            self.on_finish_triggered(events);
            return;
        }

        let Some(gate) = self.gates.iter_mut().find(|g| g.index == index) else {
            warn!("Ignoring trigger for unknown gate {}", index);
            return;
        };

        if !self.passed.insert(index) {
            return;
        }
        gate.has_passed_this_lap = true;
        debug!(
            "Checkpoint {} passed ({}/{})",
            index,
            self.passed.len(),
            self.gates.len()
        );
        events.push(KartEvent::CheckpointHit(index));

        if self.passed.len() == self.gates.len() {
            events.push(KartEvent::AllCheckpointsPassed);
        }
    }

    /// The finish line was crossed; reported whether or not the lap is valid
    pub fn on_finish_triggered(&mut self, events: &mut Vec<KartEvent>) {
        events.push(KartEvent::FinishCrossed {
            passed: self.passed_count(),
            total: self.total_gates(),
        });
    }

    /// Forget every gate passed this lap
    pub fn reset(&mut self) {
        self.passed.clear();
        for gate in &mut self.gates {
            gate.has_passed_this_lap = false;
        }
        self.finish.has_passed_this_lap = false;
    }
}
