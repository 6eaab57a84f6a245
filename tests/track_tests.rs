//! Track layout and scripted driver tests

use kart_sim::simulation::{
    wrap_angle, KartInput, Pose, Position, TrackLayout, TriggerEvent, VehicleState, WaypointPilot,
};

/// 16 points on a radius 40 circle, gates at points 3, 6, 9 and 12
fn circuit() -> TrackLayout {
    TrackLayout::circuit(40.0, 16, 8.0, 4).expect("valid track")
}

#[test]
fn test_circuit_layout() {
    let track = circuit();
    assert_eq!(track.points().len(), 16);
    assert_eq!(track.gate_count(), 4);
    assert_eq!(track.finish_position(), Position::new(40.0, 0.0, 0.0));
    assert_eq!(track.gate_position(0), Some(track.points()[3]));
    assert_eq!(track.gate_position(3), Some(track.points()[12]));
    assert!(track.gate_position(4).is_none());
}

#[test]
fn test_start_pose_faces_next_point() {
    let track = circuit();
    let pose = track.start_pose();
    let next = track.points()[1];
    let forward = pose.forward();
    let to_next = Position::new(next.x - pose.position.x, 0.0, next.z - pose.position.z);

    assert_eq!(pose.position, track.finish_position());
    assert!(forward.x * to_next.x + forward.z * to_next.z > 0.0);
}

#[test]
fn test_invalid_layouts_rejected() {
    assert!(TrackLayout::new(Vec::new(), 8.0, 0).is_err());
    assert!(TrackLayout::circuit(40.0, 16, 0.0, 4).is_err());
    assert!(TrackLayout::circuit(-1.0, 16, 8.0, 4).is_err());
    assert!(TrackLayout::circuit(40.0, 4, 8.0, 4).is_err());
}

#[test]
fn test_entering_gate_fires_trigger() {
    let track = circuit();
    let gate = track.gate_position(1).expect("gate exists");
    let outside = Position::new(gate.x, 0.0, gate.z + 20.0);

    assert_eq!(
        track.triggers_between(&outside, &gate),
        vec![TriggerEvent::Gate(1)]
    );
    // Staying inside does not fire again
    assert!(track.triggers_between(&gate, &gate).is_empty());
}

#[test]
fn test_entering_finish_fires_trigger() {
    let track = circuit();
    let before = Position::new(40.0, 0.0, -20.0);
    let finish = track.finish_position();
    assert_eq!(
        track.triggers_between(&before, &finish),
        vec![TriggerEvent::Finish]
    );
}

#[test]
fn test_wall_contact_on_leaving_track() {
    let track = circuit();
    let on_track = Position::new(40.0, 0.0, 0.0);
    let off_track = Position::new(60.0, 0.0, 0.0);
    let further_off = Position::new(70.0, 0.0, 0.0);

    assert!(track.is_on_track(&on_track));
    assert!(!track.is_on_track(&off_track));
    assert!(track.wall_contact(&on_track, &off_track).wall_hit);
    assert!(!track.wall_contact(&off_track, &further_off).wall_hit);
    assert!(!track.wall_contact(&on_track, &on_track).wall_hit);
}

#[test]
fn test_wrap_angle() {
    use std::f32::consts::PI;
    assert!((wrap_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-5);
    assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
    assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
}

#[test]
fn test_pilot_idle_without_control() {
    let track = circuit();
    let mut pilot = WaypointPilot::new(1, &track);
    let state = VehicleState::at_pose(track.start_pose());

    assert_eq!(pilot.next_input(&state, &track), KartInput::default());
}

#[test]
fn test_pilot_drives_towards_next_waypoint() {
    let track = circuit();
    let mut pilot = WaypointPilot::new(1, &track).with_jitter(0.0);
    let state = VehicleState {
        control_enabled: true,
        ..VehicleState::at_pose(track.start_pose())
    };

    let input = pilot.next_input(&state, &track);
    assert_eq!(input.throttle, 1.0);
    assert!(input.steer.abs() < 0.01);
    assert!(!input.drift_held);
    assert!(!input.boost_pressed);
    assert_eq!(pilot.target(), 1);
}

#[test]
fn test_pilot_steers_and_drifts_when_misaligned() {
    let track = circuit();
    let mut pilot = WaypointPilot::new(1, &track).with_jitter(0.0);
    let start = track.start_pose();
    // Facing well left of the next waypoint
    let state = VehicleState {
        control_enabled: true,
        ..VehicleState::at_pose(Pose::new(start.position, start.yaw - 1.0))
    };

    let input = pilot.next_input(&state, &track);
    assert_eq!(input.steer, 1.0);
    assert!(input.drift_held);
}

#[test]
fn test_pilot_boost_is_an_edge() {
    let track = circuit();
    let mut pilot = WaypointPilot::new(1, &track).with_jitter(0.0);
    let state = VehicleState {
        control_enabled: true,
        stored_boosters: 1,
        ..VehicleState::at_pose(track.start_pose())
    };

    assert!(pilot.next_input(&state, &track).boost_pressed);
    assert!(!pilot.next_input(&state, &track).boost_pressed);
}

#[test]
fn test_pilot_is_reproducible_per_seed() {
    let track = circuit();
    let state = VehicleState {
        control_enabled: true,
        ..VehicleState::at_pose(track.start_pose())
    };

    let mut a = WaypointPilot::new(42, &track);
    let mut b = WaypointPilot::new(42, &track);
    for _ in 0..10 {
        assert_eq!(a.next_input(&state, &track), b.next_input(&state, &track));
    }
}
