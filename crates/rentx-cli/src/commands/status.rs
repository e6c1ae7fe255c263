use rentx_core::connectivity::check_reachability;
use rentx_core::{Car, Connectivity, User};
use serde::Serialize;

use crate::commands::common::{connectivity_label, Session};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub config_path: String,
    pub db_path: Option<String>,
    pub api_base_url: Option<String>,
    pub network: &'static str,
    pub checkpoint: i64,
    pub cars: usize,
    pub users: usize,
    pub pending_edits: usize,
}

pub async fn collect_status(session: &Session) -> Result<StatusReport, CliError> {
    let api_base_url = session.config.api_base_url().ok();
    let network = match &api_base_url {
        Some(url) => check_reachability(url, session.config.request_timeout()).await,
        None => Connectivity::Unknown,
    };

    let store = &session.store;
    Ok(StatusReport {
        config_path: session.config_path.display().to_string(),
        db_path: store.path().map(|path| path.display().to_string()),
        api_base_url,
        network: connectivity_label(network),
        checkpoint: store.checkpoint().await?.version(),
        cars: store.collection::<Car>().query().fetch_count().await?,
        users: store.collection::<User>().query().fetch_count().await?,
        pending_edits: store.pending_mutations().await?.len(),
    })
}

pub fn format_status_lines(status: &StatusReport) -> Vec<String> {
    vec![
        format!("Config: {}", status.config_path),
        format!(
            "Replica: {}",
            status.db_path.as_deref().unwrap_or("(in memory)")
        ),
        format!(
            "Server: {}",
            status.api_base_url.as_deref().unwrap_or("(not configured)")
        ),
        format!("Network: {}", status.network),
        format!("Synced version: {}", status.checkpoint),
        format!("Cars cached: {}", status.cars),
        format!("Profiles cached: {}", status.users),
        format!("Edits waiting to push: {}", status.pending_edits),
    ]
}

pub async fn run_status(session: &Session, as_json: bool) -> Result<(), CliError> {
    let status = collect_status(session).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        for line in format_status_lines(&status) {
            println!("{line}");
        }
    }
    Ok(())
}
