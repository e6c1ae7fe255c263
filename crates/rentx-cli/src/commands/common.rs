use std::path::{Path, PathBuf};

use rentx_core::config::CONFIG_FILE_NAME;
use rentx_core::connectivity::check_reachability;
use rentx_core::models::PRICE_PLACEHOLDER;
use rentx_core::{
    Car, ClientConfig, Connectivity, ConnectivityMonitor, DetailSource, HttpGateway, LocalStore,
    User,
};
use serde::Serialize;

use crate::error::CliError;

const APP_DIR: &str = "rentx";
const DB_FILE_NAME: &str = "rentx.db";

/// Paths given on the command line
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub db_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Loaded config plus the opened replica
pub struct Session {
    pub config: ClientConfig,
    pub config_path: PathBuf,
    pub store: LocalStore,
}

impl Session {
    pub fn open(options: &GlobalOptions) -> Result<Self, CliError> {
        let config_path = resolve_config_path(options.config_path.clone());
        let config = load_config(&config_path)?;
        let db_path = resolve_db_path(options.db_path.clone(), &config);
        tracing::debug!("Opening replica at {}", db_path.display());

        let store = LocalStore::open_path(db_path)?;
        Ok(Self {
            config,
            config_path,
            store,
        })
    }

    pub fn gateway(&self) -> Result<HttpGateway, CliError> {
        let base_url = self
            .config
            .api_base_url()
            .map_err(|error| CliError::Config(error.to_string()))?;
        Ok(HttpGateway::new(base_url, self.config.request_timeout())?
            .with_access_token(self.config.access_token()))
    }

    /// Monitor seeded with one reachability check of the API host
    pub async fn connectivity(&self, gateway: &HttpGateway) -> ConnectivityMonitor {
        let state = check_reachability(gateway.base_url(), self.config.request_timeout()).await;
        tracing::debug!("API host {} is {}", gateway.base_url(), state);
        ConnectivityMonitor::new(state)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DB_FILE_NAME)
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path.unwrap_or_else(default_config_path)
}

/// Command line beats config (which already carries env overrides)
pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

pub fn load_config(path: &Path) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(path).map_err(|error| {
        CliError::Config(format!("Failed to load config at {}: {error}", path.display()))
    })?;
    config.apply_env_overrides();
    Ok(config)
}

#[derive(Debug, Serialize)]
pub struct CarListItem {
    pub id: String,
    pub brand: String,
    pub name: String,
    pub price: String,
    pub period: String,
    pub fuel_type: String,
    pub hydrated: bool,
}

pub fn car_to_list_item(car: &Car) -> CarListItem {
    CarListItem {
        id: car.id.clone(),
        brand: car.brand.clone(),
        name: car.name.clone(),
        price: car.price_label(),
        period: car.period.clone(),
        fuel_type: car.fuel_type.clone(),
        hydrated: car.is_hydrated(),
    }
}

pub fn format_car_lines(cars: &[Car]) -> Vec<String> {
    if cars.is_empty() {
        return vec!["No cars in the local replica yet. Run `rentx sync` while online.".to_string()];
    }

    cars.iter()
        .map(|car| {
            format!(
                "{}  {} {}  {} {}",
                car.id,
                car.brand,
                car.name,
                car.price_label(),
                car.period
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

/// Detail lines for one car; a cached view never shows a possibly stale price
pub fn format_car_detail(car: &Car, source: DetailSource) -> Vec<String> {
    let price = match source {
        DetailSource::Live => car.price_label(),
        DetailSource::Cached => PRICE_PLACEHOLDER.to_string(),
    };
    let mut lines = vec![
        format!("{} {}", car.brand, car.name),
        format!("Price: {price} {}", car.period)
            .trim_end()
            .to_string(),
        format!("Fuel: {}", car.fuel_type),
    ];
    if !car.about.is_empty() {
        lines.push(String::new());
        lines.push(car.about.clone());
    }

    match &car.accessories {
        Some(accessories) if !accessories.is_empty() => {
            lines.push(String::new());
            lines.push("Accessories:".to_string());
            for accessory in accessories {
                lines.push(format!("  [{}] {}", accessory.kind, accessory.name));
            }
        }
        Some(_) => {}
        None => lines.push("Accessories: not loaded yet".to_string()),
    }

    lines.push(String::new());
    lines.push("Photos:".to_string());
    for url in car.gallery() {
        lines.push(format!("  {url}"));
    }
    lines
}

pub fn format_user_lines(users: &[User]) -> Vec<String> {
    if users.is_empty() {
        return vec!["No profile cached yet. Run `rentx sync` while online.".to_string()];
    }

    users
        .iter()
        .map(|user| {
            format!(
                "{}  {} <{}>  CNH {}",
                user.id, user.name, user.email, user.driver_license
            )
        })
        .collect()
}

pub const fn connectivity_label(state: Connectivity) -> &'static str {
    match state {
        Connectivity::Connected => "online",
        Connectivity::Disconnected => "offline",
        Connectivity::Unknown => "unknown",
    }
}
