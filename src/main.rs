use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use kart_sim::simulation::{
    format_time, CollisionSignal, KartConfig, KartEvent, RaceConfig, RaceSession, RaceState,
    TrackLayout, WaypointPilot,
};

#[derive(Parser)]
#[command(name = "kart_sim")]
#[command(about = "Headless kart racing simulation")]
struct Cli {
    /// Number of laps to race
    #[arg(long, default_value = "3")]
    laps: u32,

    /// Number of checkpoint gates on the track, excluding the finish line
    #[arg(long, default_value = "4")]
    gates: usize,

    /// Countdown before the start, in whole seconds
    #[arg(long, default_value = "3")]
    countdown: u32,

    /// Maximum number of fixed ticks to simulate
    #[arg(long, default_value = "6000")]
    ticks: u32,

    /// Fixed time step in seconds
    #[arg(long, default_value = "0.02")]
    delta: f32,

    /// Seed for the scripted driver
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Radius of the circular test track
    #[arg(long, default_value = "40.0")]
    track_radius: f32,

    /// Sleep between ticks so the run takes real time
    #[arg(long)]
    realtime: bool,
}

/// Centerline points on the generated circuit
const TRACK_POINTS: usize = 16;

/// Half the drivable width of the generated circuit
const TRACK_HALF_WIDTH: f32 = 8.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run a full race with the scripted driver, logging as it goes
fn run_headless(cli: &Cli) -> Result<()> {
    info!("Running kart simulation in headless mode...");
    info!("Ticks: {}, Delta: {}s, Seed: {}", cli.ticks, cli.delta, cli.seed);

    if cli.delta.is_nan() || cli.delta <= 0.0 {
        anyhow::bail!("--delta must be positive, got {}", cli.delta);
    }

    let track = TrackLayout::circuit(cli.track_radius, TRACK_POINTS, TRACK_HALF_WIDTH, cli.gates)
        .context("Failed to build track")?;
    let race_config = RaceConfig {
        total_laps: cli.laps,
        countdown_seconds: cli.countdown,
        ..RaceConfig::default()
    };
    let mut session = RaceSession::new(
        KartConfig::default(),
        race_config,
        track.gate_count(),
        track.start_pose(),
    )
    .context("Failed to set up race session")?;

    let hud = session.add_listener(Box::new(|event: &KartEvent| log_event(event)));
    let mut pilot = WaypointPilot::new(cli.seed, &track);

    session.start_race();

    let ticks_per_second = (1.0 / cli.delta).ceil() as u32;
    let mut pending_collision = CollisionSignal::NONE;
    let mut wall_hits = 0u32;
    let mut finished = false;

    for tick in 1..=cli.ticks {
        let Some(before) = session.vehicle().copied() else {
            break;
        };

        let input = pilot.next_input(&before, &track);
        session.on_fixed_tick(cli.delta, input, pending_collision);

        let after = session.vehicle().copied().unwrap_or(before);
        let previous = before.pose.position;
        let current = after.pose.position;

        pending_collision = track.wall_contact(&previous, &current);
        if pending_collision.wall_hit {
            wall_hits += 1;
        }
        for trigger in track.triggers_between(&previous, &current) {
            session.on_trigger_event(trigger);
        }

        session.on_frame_tick(cli.delta);

        if tick % ticks_per_second == 0 {
            debug!(
                "tick {}: speed={:.1} lap={} time={}",
                tick,
                after.speed,
                session.progress().current_lap,
                format_time(session.progress().race_time)
            );
        }

        if session.state() == RaceState::Finished {
            finished = true;
            break;
        }

        if cli.realtime {
            std::thread::sleep(std::time::Duration::from_secs_f32(cli.delta));
        }
    }

    session.remove_listener(hud);

    if finished {
        info!("=== RACE COMPLETE ===");
    } else {
        warn!("Race did not finish within {} ticks", cli.ticks);
    }
    info!("Wall hits: {}", wall_hits);
    session.print_summary();
    Ok(())
}

/// Presentation stand-in: report notable events on the log
fn log_event(event: &KartEvent) {
    match event {
        KartEvent::CountdownTick(0) => info!("GO!"),
        KartEvent::CountdownTick(n) => info!("Countdown: {}", n),
        KartEvent::CheckpointHit(index) => debug!("Checkpoint {} hit", index),
        KartEvent::FinishIgnored { missing_gates } => {
            warn!("Finish crossed with {} checkpoints missing", missing_gates)
        }
        KartEvent::LapCompleted {
            current_lap,
            total_laps,
            lap_time,
        } => info!(
            "Lap time {} - now on lap {}/{}",
            format_time(*lap_time),
            current_lap,
            total_laps
        ),
        KartEvent::BestLapChanged(best) => info!("New best lap: {}", format_time(*best)),
        KartEvent::BoostStateChanged(true) => debug!("Boost!"),
        KartEvent::BoosterCountChanged(count) => debug!("Boosters: {}", count),
        KartEvent::RaceFinished { total_time } => {
            info!("Finished! Total time: {}", format_time(*total_time))
        }
        KartEvent::MessageShown(text) => info!("[HUD] {}", text),
        _ => {}
    }
}
