use std::process::{Command, Output};

fn run_simulation(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(&["run", "--"])
        .args(args)
        .env("RUST_LOG", "warn,kart_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the headless race runs without crashing
#[test]
fn test_headless_race_runs() {
    let output = run_simulation(&[]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stderr.contains("RACE COMPLETE"),
        "Race did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that the race summary is logged
#[test]
fn test_race_summary_logged() {
    let output = run_simulation(&[]);

    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stderr.contains("=== Race Summary ==="),
        "Missing race summary header"
    );
    assert!(stderr.contains("Total time:"), "Missing 'Total time' line");
    assert!(stderr.contains("Best lap:"), "Missing 'Best lap' line");
    assert!(
        stderr.contains("Physics ticks:"),
        "Missing 'Physics ticks' line"
    );
}

/// Test that every lap of a short race is counted
#[test]
fn test_all_laps_counted() {
    let output = run_simulation(&["--laps", "2"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);

    // Format: "[2025-11-17T17:10:52Z INFO  kart_sim::simulation::session] Lap: 2/2 (2 completed)"
    let lap_line = stderr
        .lines()
        .find(|line| line.contains("completed)"))
        .expect("Could not find lap summary line");

    let completed: u32 = lap_line
        .rsplit('(')
        .next()
        .and_then(|s| s.split_whitespace().next())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("Could not parse completed laps from line: {}", lap_line));

    assert_eq!(completed, 2, "Expected both laps to be completed");
}

/// Test that a bad time step is rejected
#[test]
fn test_invalid_delta_rejected() {
    let output = run_simulation(&["--delta", "0"]);

    assert!(
        !output.status.success(),
        "Simulation should refuse a zero time step"
    );
}
