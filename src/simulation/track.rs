//! Track layout used by the headless host
//!
//! Stands in for the trigger volumes and wall colliders a game engine would
//! provide: it turns kart positions into gate/finish trigger events and
//! wall contacts. Track generation itself is reduced to a closed polyline.

use anyhow::{bail, Result};

use super::types::{CollisionSignal, Pose, Position, TriggerEvent};

/// A closed loop of centerline points with gates placed along it
#[derive(Debug, Clone)]
pub struct TrackLayout {
    points: Vec<Position>,
    half_width: f32,
    trigger_radius: f32,
    /// Centerline point index of each gate, by gate index
    gate_points: Vec<usize>,
}

impl TrackLayout {
    /// Build a layout from centerline points; point 0 holds the finish line
    ///
    /// Gates are spread evenly over the remaining points.
    pub fn new(points: Vec<Position>, half_width: f32, gate_count: usize) -> Result<Self> {
        if points.is_empty() {
            bail!("Track needs at least 1 point");
        }
        if half_width.is_nan() || half_width <= 0.0 {
            bail!("Track half width must be positive, got {}", half_width);
        }
        if gate_count >= points.len() {
            bail!(
                "{} gates do not fit on a track of {} points",
                gate_count,
                points.len()
            );
        }

        let gate_points = (0..gate_count)
            .map(|gate| (gate + 1) * points.len() / (gate_count + 1))
            .collect();

        Ok(Self {
            points,
            half_width,
            trigger_radius: half_width + 1.0,
            gate_points,
        })
    }

    /// A circle of `point_count` points around the origin
    pub fn circuit(radius: f32, point_count: usize, half_width: f32, gate_count: usize) -> Result<Self> {
        if radius.is_nan() || radius <= 0.0 {
            bail!("Track radius must be positive, got {}", radius);
        }
        let points = (0..point_count)
            .map(|i| {
                let angle = i as f32 / point_count as f32 * std::f32::consts::TAU;
                Position::new(radius * angle.cos(), 0.0, radius * angle.sin())
            })
            .collect();
        Self::new(points, half_width, gate_count)
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn gate_count(&self) -> usize {
        self.gate_points.len()
    }

    pub fn gate_position(&self, gate: usize) -> Option<Position> {
        self.gate_points.get(gate).map(|&point| self.points[point])
    }

    pub fn finish_position(&self) -> Position {
        self.points[0]
    }

    /// On the finish line, facing the next centerline point
    pub fn start_pose(&self) -> Pose {
        let start = self.points[0];
        let yaw = match self.points.get(1) {
            Some(next) => start.angle_to(next),
            None => 0.0,
        };
        Pose::new(start, yaw)
    }

    /// Planar distance from `position` to the closest point of the centerline
    pub fn distance_to_centerline(&self, position: &Position) -> f32 {
        if self.points.len() == 1 {
            return position.planar_distance(&self.points[0]);
        }
        self.points
            .iter()
            .zip(self.points.iter().cycle().skip(1))
            .map(|(start, end)| position.planar_distance(&position.closest_on_segment(start, end)))
            .fold(f32::INFINITY, f32::min)
    }

    pub fn is_on_track(&self, position: &Position) -> bool {
        self.distance_to_centerline(position) <= self.half_width
    }

    /// Trigger volumes entered while moving from `previous` to `current`
    pub fn triggers_between(&self, previous: &Position, current: &Position) -> Vec<TriggerEvent> {
        let entered = |center: &Position| {
            previous.planar_distance(center) > self.trigger_radius
                && current.planar_distance(center) <= self.trigger_radius
        };

        let mut triggers: Vec<TriggerEvent> = self
            .gate_points
            .iter()
            .enumerate()
            .filter(|(_, point)| entered(&self.points[**point]))
            .map(|(gate, _)| TriggerEvent::Gate(gate))
            .collect();

        if entered(&self.points[0]) {
            triggers.push(TriggerEvent::Finish);
        }
        triggers
    }

    /// Wall contact happens on the tick the kart leaves the track band
    pub fn wall_contact(&self, previous: &Position, current: &Position) -> CollisionSignal {
        CollisionSignal {
            wall_hit: self.is_on_track(previous) && !self.is_on_track(current),
        }
    }
}
