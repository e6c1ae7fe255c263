use std::sync::Arc;

use rentx_core::{
    ReachabilityProbe, RoundReport, RoundSummary, SkipReason, SyncCoordinator, SyncTrigger,
    TriggerPolicy,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::Session;
use crate::error::CliError;

/// Run one round and report what it did
pub async fn run_sync(session: &Session) -> Result<RoundReport, CliError> {
    let gateway = session.gateway()?;
    let monitor = session.connectivity(&gateway).await;
    let coordinator = SyncCoordinator::new(session.store.clone(), gateway, monitor);

    let report = coordinator.run_round().await?;
    for line in format_round_report(&report) {
        println!("{line}");
    }
    Ok(report)
}

pub fn format_round_report(report: &RoundReport) -> Vec<String> {
    match report {
        RoundReport::Skipped(SkipReason::Offline) => {
            vec!["Offline: sync skipped, local data unchanged".to_string()]
        }
        RoundReport::Skipped(SkipReason::InFlight) => {
            vec!["Sync already in progress".to_string()]
        }
        RoundReport::Completed(summary) => format_summary(summary),
    }
}

fn format_summary(summary: &RoundSummary) -> Vec<String> {
    let applied = summary.applied;
    let mut lines = vec![
        format!("Sync completed: version {} -> {}", summary.from, summary.to),
        format!(
            "  cars: {} updated, {} removed",
            applied.cars_upserted, applied.cars_deleted
        ),
        format!(
            "  users: {} updated, {} removed",
            applied.users_upserted, applied.users_deleted
        ),
    ];
    if applied.users_kept_local > 0 {
        lines.push(format!(
            "  {} local profile edits kept over server versions",
            applied.users_kept_local
        ));
    }
    lines.push(format!("  pushed {} local edits", summary.pushed));
    if let Some(error) = &summary.push_error {
        lines.push(format!("  {error}; edits stay queued for the next sync"));
    }
    lines
}

/// Probe the API host and sync on every reconnect until Ctrl-C
///
/// Pressing Enter counts as the app returning to the foreground.
pub async fn run_watch(session: &Session) -> Result<(), CliError> {
    let gateway = session.gateway()?;
    let base_url = gateway.base_url().to_string();
    let monitor = session.connectivity(&gateway).await;

    let probe = ReachabilityProbe::spawn(
        monitor.clone(),
        base_url.clone(),
        session.config.probe_interval(),
        session.config.request_timeout(),
    )
    .map_err(|error| CliError::Config(format!("Failed to start reachability probe: {error}")))?;

    let coordinator = Arc::new(SyncCoordinator::new(
        session.store.clone(),
        gateway,
        monitor.clone(),
    ));
    let mut state = coordinator.subscribe_state();
    let trigger = SyncTrigger::start(
        Arc::clone(&coordinator),
        &monitor,
        TriggerPolicy {
            sync_on_start: session.config.sync_on_start,
        },
    );

    println!(
        "Watching {base_url} (network {}). Press Enter to sync, Ctrl-C to stop.",
        monitor.current()
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(error) = result {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", error);
                }
                tracing::info!("Stopping sync watch");
                break;
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                println!("sync: {current}");
            }
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => trigger.app_resumed(),
                    Ok(None) => stdin_open = false,
                    Err(error) => {
                        tracing::warn!("Failed to read stdin: {}", error);
                        stdin_open = false;
                    }
                }
            }
        }
    }

    trigger.shutdown();
    probe.stop();
    Ok(())
}
