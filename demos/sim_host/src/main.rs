//! # sim_host — demonstration host loop
//!
//! This binary is not part of the scheduler itself — it plays the role of
//! the "host game loop" that `spec.md` §1 explicitly scopes out of the
//! core, so that `sched_engine`'s embedding contract (§6) has something
//! concrete driving it. It contains no scheduling logic of its own.
//!
//! Mirrors `engine_app::main`'s startup shape: init tracing, build a
//! config, hand it to a fixed-timestep loop.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sched_core::Schedule;
use sched_runtime::SchedulerBuilder;

/// Fixed-timestep host loop configuration.
#[derive(Debug, Clone)]
struct TickHostConfig {
    /// Target ticks per second.
    tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    max_ticks: u64,
}

impl Default for TickHostConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            max_ticks: 100,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sim_host=info".parse()?))
        .init();

    info!("sim_host starting");

    let engine = SchedulerBuilder::new(tokio::runtime::Handle::current()).build();
    let config = TickHostConfig::default();

    // A Sync task that re-arms itself every 5 ticks, for as long as it's
    // alive — a stand-in for a periodic simulation system.
    let mut ticks_seen = 0u64;
    engine.submit_sync(move || {
        ticks_seen += 1;
        info!(ticks_seen, "periodic tick task ran");
        Schedule::tick(5).unwrap()
    });

    // An Async task that re-arms itself after a wall-clock delay — a
    // stand-in for a background job like autosave or telemetry flush.
    engine.submit_async(|| {
        info!("background duration task ran");
        Schedule::duration(Duration::from_millis(250))
    });

    // A task that parks itself after its first run and waits for an
    // external unpark — a stand-in for "suspend until a player connects".
    let parked_handle = engine.submit_sync(|| {
        info!("one-shot task ran once; parking until unparked");
        Schedule::park()
    });

    // Simulate an external event unparking it a couple of seconds in.
    let unparker = parked_handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        if let Err(err) = unparker.unpark() {
            warn!(%err, "failed to unpark demo task (already stopped?)");
        }
    });

    run_fixed_timestep(&engine, &config).await;

    info!("sim_host shut down");
    Ok(())
}

/// Drives `engine.process_tick()` at a fixed cadence, sleeping off any
/// leftover budget each tick — mirrors `TickLoop::run_async`'s
/// elapsed-vs-budget bookkeeping.
async fn run_fixed_timestep(engine: &sched_engine::SchedulerEngine, config: &TickHostConfig) {
    let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate);
    let mut tick_count = 0u64;

    info!(
        tick_rate = config.tick_rate,
        max_ticks = config.max_ticks,
        "starting fixed-timestep host loop"
    );

    loop {
        let start = Instant::now();
        let tick = engine.process_tick();

        tick_count += 1;
        if config.max_ticks > 0 && tick_count >= config.max_ticks {
            info!(ticks = tick_count, final_tick = tick, "host loop complete");
            break;
        }

        let elapsed = start.elapsed();
        if elapsed < tick_duration {
            tokio::time::sleep(tick_duration - elapsed).await;
        } else {
            warn!(
                tick,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = tick_duration.as_millis() as u64,
                "tick exceeded time budget"
            );
        }
    }
}
