use clap::Subcommand;
use moodelix_core::ProfileService;

use super::{load_config, open_backend, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show streak statistics and today's progress
    Show,
    /// Set the daily focus goal; clamped to 1-12 hours
    Goal {
        hours: u32,
    },
}

pub fn run(action: StreakAction) -> CliResult {
    runtime()?.block_on(execute(action))
}

async fn execute(action: StreakAction) -> CliResult {
    let mut cfg = load_config()?;
    let backend = open_backend(&mut cfg).await?;
    let profiles = ProfileService::new(backend.store, backend.token);

    match action {
        StreakAction::Show => {
            let profile = profiles
                .load_profile()
                .await
                .ok_or("profile could not be loaded")?;
            let streak = &profile.streak_data;
            print_json(&serde_json::json!({
                "streak": streak,
                "today_progress_pct": streak.focus_progress_pct(),
            }))?;
        }
        StreakAction::Goal { hours } => {
            let streak = profiles
                .update_daily_goal(hours)
                .await
                .ok_or("daily goal was not saved")?;
            print_json(&streak)?;
        }
    }
    Ok(())
}
