use std::path::PathBuf;

use chrono::NaiveDate;
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use rentx_core::models::TableChanges;
use rentx_core::{
    Car, ChangeSet, Checkpoint, ClientConfig, DetailSource, LocalStore, ProfileEdit, RoundReport,
    SkipReason, User,
};
use serde_json::json;
use tempfile::TempDir;

use crate::commands::common::{
    format_car_detail, format_car_lines, format_user_lines, resolve_db_path, GlobalOptions,
    Session,
};
use crate::commands::config::{format_config_lines, run_config_set, ConfigUpdates};
use crate::commands::profile::run_profile_edit;
use crate::commands::rent::run_rent;
use crate::commands::status::{collect_status, format_status_lines};
use crate::commands::sync::{format_round_report, run_sync};
use crate::error::CliError;

fn car(id: &str, price: Option<f64>) -> Car {
    Car {
        id: id.to_string(),
        name: "RS 5 Coupé".to_string(),
        brand: "Audi".to_string(),
        about: "Fast and comfortable".to_string(),
        period: "Ao dia".to_string(),
        price,
        fuel_type: "gasoline_motor".to_string(),
        thumbnail: format!("https://cdn.rentx.dev/{id}.png"),
        accessories: None,
        photos: None,
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        user_id: format!("account-{id}"),
        name: "Hariel".to_string(),
        email: "hariel@rentx.dev".to_string(),
        driver_license: "123456".to_string(),
        avatar: None,
    }
}

fn session(dir: &TempDir, api_base_url: Option<String>) -> Session {
    Session {
        config: ClientConfig {
            api_base_url,
            request_timeout_secs: 2,
            ..ClientConfig::default()
        },
        config_path: dir.path().join("rentx-config.json"),
        store: LocalStore::open_path(dir.path().join("rentx.db")).unwrap(),
    }
}

async fn seed_cars(session: &Session, cars: Vec<Car>) {
    let changes = ChangeSet {
        cars: TableChanges {
            created: cars,
            ..TableChanges::default()
        },
        ..ChangeSet::default()
    };
    session
        .store
        .apply_changes(&changes, Checkpoint::new(1))
        .await
        .unwrap();
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

#[test]
fn car_lines_show_placeholder_for_unknown_price() {
    let lines = format_car_lines(&[car("c1", Some(120.0)), car("c2", None)]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("R$ 120"));
    assert!(lines[1].contains("Audi RS 5 Coupé  -- Ao dia"));
}

#[test]
fn car_lines_explain_empty_replica() {
    let lines = format_car_lines(&[]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("rentx sync"));
}

#[test]
fn car_detail_falls_back_to_thumbnail() {
    let lines = format_car_detail(&car("c1", Some(120.0)), DetailSource::Live);
    assert!(lines.contains(&"Price: R$ 120 Ao dia".to_string()));
    assert!(lines.contains(&"Accessories: not loaded yet".to_string()));
    assert!(lines.contains(&"  https://cdn.rentx.dev/c1.png".to_string()));
}

#[test]
fn cached_car_detail_hides_price() {
    let lines = format_car_detail(&car("c1", Some(120.0)), DetailSource::Cached);
    assert!(lines.contains(&"Price: -- Ao dia".to_string()));
    assert!(!lines.iter().any(|line| line.contains("R$")));
}

#[test]
fn user_lines_list_cached_profiles() {
    let lines = format_user_lines(&[user("u1")]);
    assert_eq!(lines, vec!["u1  Hariel <hariel@rentx.dev>  CNH 123456".to_string()]);
}

#[test]
fn db_path_prefers_command_line_over_config() {
    let config = ClientConfig {
        db_path: Some(PathBuf::from("/data/config.db")),
        ..ClientConfig::default()
    };

    assert_eq!(
        resolve_db_path(Some(PathBuf::from("/tmp/cli.db")), &config),
        PathBuf::from("/tmp/cli.db")
    );
    assert_eq!(resolve_db_path(None, &config), PathBuf::from("/data/config.db"));
    assert!(resolve_db_path(None, &ClientConfig::default()).ends_with("rentx/rentx.db"));
}

#[test]
fn config_set_persists_and_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rentx-config.json");

    let saved = run_config_set(
        &path,
        ConfigUpdates {
            api_url: Some("https://api.rentx.dev/".to_string()),
            sync_on_start: Some(false),
            access_token: Some("token".to_string()),
            ..ConfigUpdates::default()
        },
    )
    .unwrap();
    assert_eq!(saved.api_base_url.as_deref(), Some("https://api.rentx.dev"));
    assert!(!saved.sync_on_start);

    let lines = format_config_lines(&saved, &path);
    assert!(lines.contains(&"access_token: [REDACTED]".to_string()));

    let rejected = run_config_set(
        &path,
        ConfigUpdates {
            api_url: Some("api.rentx.dev".to_string()),
            ..ConfigUpdates::default()
        },
    );
    assert!(matches!(rejected, Err(CliError::Config(_))));
    let reloaded = ClientConfig::load_from_path(&path).unwrap();
    assert_eq!(reloaded.api_base_url.as_deref(), Some("https://api.rentx.dev"));
}

#[tokio::test(flavor = "multi_thread")]
async fn session_open_creates_replica_on_disk() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("rentx.db");

    let session = Session::open(&GlobalOptions {
        db_path: Some(db_path.clone()),
        config_path: Some(dir.path().join("missing-config.json")),
    })
    .unwrap();

    assert_eq!(session.store.path(), Some(db_path.as_path()));
    assert!(db_path.exists());
    assert_eq!(session.store.checkpoint().await.unwrap(), Checkpoint::ORIGIN);
}

#[tokio::test(flavor = "multi_thread")]
async fn profile_edit_works_offline_and_queues_push() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, None);
    session.store.save_user(&user("u1")).await.unwrap();

    let edit = ProfileEdit {
        name: Some(" Hariel Giacomuzzi ".to_string()),
        ..ProfileEdit::default()
    };
    let edited = run_profile_edit(&session, "u1", &edit).await.unwrap();

    assert_eq!(edited.name, "Hariel Giacomuzzi");
    let pending = session.store.pending_mutations().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payload.name, "Hariel Giacomuzzi");
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_profile_edit_is_rejected() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, None);
    session.store.save_user(&user("u1")).await.unwrap();

    let edit = ProfileEdit {
        name: Some("   ".to_string()),
        ..ProfileEdit::default()
    };
    let result = run_profile_edit(&session, "u1", &edit).await;

    assert!(matches!(result, Err(CliError::EmptyProfileEdit)));
    assert!(session.store.pending_mutations().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_pulls_into_replica_and_pushes_edits() {
    let mut server = Server::new_async().await;
    let pull = server
        .mock("GET", "/cars/sync/pull")
        .match_query(Matcher::UrlEncoded("lastPulledVersion".into(), "0".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "changes": {
                    "cars": {"created": [{"id": "car-a", "name": "RS 5", "brand": "Audi", "price": 120}]},
                    "users": {}
                },
                "latestVersion": 5
            })
            .to_string(),
        )
        .create_async()
        .await;
    let push = server
        .mock("POST", "/users/sync")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""id":"u1""#.to_string()),
            Matcher::Regex(r#""name":"Edited""#.to_string()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let session = session(&dir, Some(server.url()));
    session.store.save_user(&user("u1")).await.unwrap();
    session
        .store
        .update_profile(
            "u1",
            &ProfileEdit {
                name: Some("Edited".to_string()),
                ..ProfileEdit::default()
            },
        )
        .await
        .unwrap();

    let report = run_sync(&session).await.unwrap();

    pull.assert_async().await;
    push.assert_async().await;
    let summary = report.summary().unwrap();
    assert_eq!(summary.to, Checkpoint::new(5));
    assert_eq!(summary.pushed, 1);
    assert_eq!(session.store.checkpoint().await.unwrap(), Checkpoint::new(5));
    let cached = session.store.collection::<Car>().find("car-a").await.unwrap().unwrap();
    assert_eq!(cached.price_label(), "R$ 120");
    assert!(session.store.pending_mutations().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_while_unreachable_is_skipped() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, Some("http://127.0.0.1:9".to_string()));

    let report = run_sync(&session).await.unwrap();

    assert!(matches!(report, RoundReport::Skipped(SkipReason::Offline)));
    assert_eq!(session.store.checkpoint().await.unwrap(), Checkpoint::ORIGIN);
    assert_eq!(
        format_round_report(&report),
        vec!["Offline: sync skipped, local data unchanged".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_without_api_url_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, None);

    assert!(matches!(run_sync(&session).await, Err(CliError::Config(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn rent_refreshes_price_before_posting_rental() {
    let mut server = Server::new_async().await;
    let detail = server
        .mock("GET", "/cars/c1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"id": "c1", "name": "RS 5 Coupé", "brand": "Audi", "price": 120})
                .to_string(),
        )
        .create_async()
        .await;
    let rental = server
        .mock("POST", "/rentals")
        .match_body(Matcher::PartialJson(json!({
            "user_id": "u1",
            "car_id": "c1",
            "start_date": "2026-10-10",
            "end_date": "2026-10-12",
            "total": 360.0
        })))
        .with_status(201)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let session = session(&dir, Some(server.url()));
    // Listed without a price; only the detail endpoint knows it
    seed_cars(&session, vec![car("c1", None)]).await;

    let request = run_rent(&session, "c1", "u1", &[date(12), date(10), date(11), date(10)])
        .await
        .unwrap();

    detail.assert_async().await;
    rental.assert_async().await;
    assert_eq!(request.period_label(), "10/10/2026 - 12/10/2026");
    let cached = session.store.collection::<Car>().find("c1").await.unwrap().unwrap();
    assert_eq!(cached.price, Some(120.0));
}

#[tokio::test(flavor = "multi_thread")]
async fn rent_requires_connection() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, Some("http://127.0.0.1:9".to_string()));
    seed_cars(&session, vec![car("c1", Some(120.0))]).await;

    let result = run_rent(&session, "c1", "u1", &[date(10)]).await;

    assert!(matches!(result, Err(CliError::Offline(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn rent_unknown_car_is_not_found() {
    let mut server = Server::new_async().await;
    let _detail = server
        .mock("GET", "/cars/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Car not found"}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let session = session(&dir, Some(server.url()));

    let result = run_rent(&session, "missing", "u1", &[date(10)]).await;

    assert!(matches!(result, Err(CliError::CarNotFound(id)) if id == "missing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_reports_replica_contents_offline() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir, None);
    seed_cars(&session, vec![car("c1", None), car("c2", Some(90.0))]).await;
    session.store.save_user(&user("u1")).await.unwrap();

    let status = collect_status(&session).await.unwrap();

    assert_eq!(status.network, "unknown");
    assert_eq!(status.checkpoint, 1);
    assert_eq!(status.cars, 2);
    assert_eq!(status.users, 1);
    assert_eq!(status.pending_edits, 0);
    let lines = format_status_lines(&status);
    assert!(lines.contains(&"Server: (not configured)".to_string()));
}
