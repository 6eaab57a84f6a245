//! Clock, scheduler and time display tests

use kart_sim::simulation::{format_time, Clock, ManualClock, Scheduler, SystemClock};

#[test]
fn test_format_time() {
    assert_eq!(format_time(0.0), "00:00.000");
    assert_eq!(format_time(65.005), "01:05.005");
    assert_eq!(format_time(125.4321), "02:05.432");
    assert_eq!(format_time(9.5), "00:09.500");
}

#[test]
fn test_format_time_rounds_to_millis() {
    // 59.9996s rounds up into the next minute
    assert_eq!(format_time(59.9996), "01:00.000");
    assert_eq!(format_time(1.2344), "00:01.234");
}

#[test]
fn test_format_time_edge_inputs() {
    assert_eq!(format_time(-3.0), "00:00.000");
    assert_eq!(format_time(f32::NAN), "00:00.000");
    assert_eq!(format_time(f32::INFINITY), "00:00.000");
    // Minutes are not wrapped at the hour
    assert_eq!(format_time(3600.0), "60:00.000");
}

#[test]
fn test_manual_clock_advances_only_forward() {
    let mut clock = ManualClock::new();
    assert_eq!(clock.now(), 0.0);

    clock.advance(0.5);
    clock.advance(0.25);
    assert_eq!(clock.now(), 0.75);

    clock.advance(-1.0);
    assert_eq!(clock.now(), 0.75);
}

#[test]
fn test_system_clock_ignores_frame_advance() {
    let mut clock = SystemClock::new();
    clock.advance(100.0);
    assert!(clock.now() < 100.0);
    assert!(clock.now() >= 0.0);
}

#[test]
fn test_scheduler_fires_in_due_order() {
    let mut scheduler = Scheduler::new();
    let token = scheduler.begin_sequence();
    scheduler.schedule(token, 2.0, "late");
    scheduler.schedule(token, 1.0, "first");
    scheduler.schedule(token, 1.0, "second");

    assert!(scheduler.poll(0.5).is_empty());

    let fired: Vec<&str> = scheduler.poll(1.0).into_iter().map(|(_, _, p)| p).collect();
    assert_eq!(fired, vec!["first", "second"]);
    assert_eq!(scheduler.len(), 1);

    let fired: Vec<&str> = scheduler.poll(5.0).into_iter().map(|(_, _, p)| p).collect();
    assert_eq!(fired, vec!["late"]);
    assert!(scheduler.is_empty());
}

#[test]
fn test_scheduler_tolerates_accumulated_rounding() {
    let mut scheduler = Scheduler::new();
    let token = scheduler.begin_sequence();
    scheduler.schedule(token, 1.0, ());

    // Ten frames of 0.1s land just below 1.0
    let mut now = 0.0f64;
    for _ in 0..10 {
        now += 0.1;
    }
    assert_eq!(scheduler.poll(now).len(), 1);
}

#[test]
fn test_cancelled_sequence_never_fires() {
    let mut scheduler = Scheduler::new();
    let stale = scheduler.begin_sequence();
    let live = scheduler.begin_sequence();
    assert_ne!(stale, live);

    scheduler.schedule(stale, 1.0, 1);
    scheduler.schedule(stale, 2.0, 2);
    scheduler.schedule(live, 2.0, 20);

    assert_eq!(scheduler.cancel(stale), 2);
    assert!(!scheduler.is_pending(stale));
    assert!(scheduler.is_pending(live));

    let fired = scheduler.poll(3.0);
    assert_eq!(fired, vec![(live, 2.0, 20)]);
}

#[test]
fn test_cancel_all() {
    let mut scheduler = Scheduler::new();
    let a = scheduler.begin_sequence();
    let b = scheduler.begin_sequence();
    scheduler.schedule(a, 1.0, 'a');
    scheduler.schedule(b, 1.0, 'b');

    assert_eq!(scheduler.cancel_all(), 2);
    assert!(scheduler.poll(10.0).is_empty());
}

#[test]
fn test_poll_reports_due_time_not_poll_time() {
    let mut scheduler = Scheduler::new();
    let token = scheduler.begin_sequence();
    scheduler.schedule(token, 1.0, "one");
    scheduler.schedule(token, 3.0, "three");

    // A single long step releases both at their own due times
    let fired = scheduler.poll(10.0);
    assert_eq!(fired, vec![(token, 1.0, "one"), (token, 3.0, "three")]);
}
