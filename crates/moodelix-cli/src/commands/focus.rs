use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use moodelix_core::{Event, FocusMode, ProfileService, TimerEngine};
use tracing::warn;

use super::{load_config, open_backend, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Show the break checkpoints a focus session would get
    Plan {
        /// Focus length in minutes (25-240); defaults to schedule.focus
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Run a focus session in the terminal, printing events as JSON lines
    Run {
        /// Focus length in minutes (25-240); defaults to schedule.focus
        #[arg(long)]
        minutes: Option<u32>,
        /// Disable mid-session breaks for this run
        #[arg(long)]
        no_breaks: bool,
        /// Do not record the finished cycle in the streak
        #[arg(long)]
        no_record: bool,
    },
    /// Print the configured timer state
    Status,
}

fn build_engine(minutes: Option<u32>, no_breaks: bool) -> CliResult<(TimerEngine, bool)> {
    let cfg = load_config()?;
    let mut auto_break = cfg.auto_break_settings();
    if no_breaks {
        auto_break.enabled = false;
    }
    let mut engine = TimerEngine::new(cfg.timer_durations(), auto_break)
        .with_auto_continue(cfg.schedule.auto_advance);
    if let Some(minutes) = minutes {
        engine.set_duration(FocusMode::Focus, minutes)?;
    }
    Ok((engine, cfg.schedule.auto_advance))
}

pub fn run(action: FocusAction) -> CliResult {
    match action {
        FocusAction::Plan { minutes } => {
            let (mut engine, _) = build_engine(minutes, false)?;
            if let Some(event) = engine.start() {
                print_json(&event)?;
            }
        }
        FocusAction::Status => {
            let (engine, _) = build_engine(None, false)?;
            print_json(&engine.snapshot())?;
        }
        FocusAction::Run {
            minutes,
            no_breaks,
            no_record,
        } => {
            let (engine, auto_advance) = build_engine(minutes, no_breaks)?;
            runtime()?.block_on(run_session(engine, auto_advance, !no_record))?;
        }
    }
    Ok(())
}

async fn run_session(mut engine: TimerEngine, auto_advance: bool, record: bool) -> CliResult {
    let mut cfg = load_config()?;
    let profiles = if record {
        let backend = open_backend(&mut cfg).await?;
        let profiles = ProfileService::new(backend.store, backend.token);
        if let Some(profile) = profiles.load_profile().await {
            engine = engine.with_streak(profile.streak_data);
        }
        Some(profiles)
    } else {
        None
    };

    if let Some(event) = engine.start() {
        println!("{}", serde_json::to_string(&event)?);
    }

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = engine.reset() {
                    println!("{}", serde_json::to_string(&event)?);
                }
                return Ok(());
            }
        }

        let Some(event) = engine.tick() else {
            eprint!("\r{} {}  ", engine.mode().label(), engine.display());
            continue;
        };
        eprintln!();
        println!("{}", serde_json::to_string(&event)?);

        match &event {
            Event::FocusCycleCompleted { focus_minutes, .. } => {
                if let Some(profiles) = &profiles {
                    let today = Local::now().date_naive();
                    if profiles
                        .record_focus_complete(today, *focus_minutes)
                        .await
                        .is_none()
                    {
                        warn!("focus cycle finished but the streak was not saved");
                    }
                }
                return Ok(());
            }
            _ if !auto_advance => {
                // The engine stops at each transition without auto-advance.
                if let Some(event) = engine.start() {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            _ => {}
        }
    }
}
