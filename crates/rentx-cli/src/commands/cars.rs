use rentx_core::{Car, CarDetail, DetailRefresher, DetailSource};

use crate::commands::common::{car_to_list_item, format_car_detail, format_car_lines, CarListItem, Session};
use crate::error::CliError;

/// List cars straight from the replica; never touches the network
pub async fn run_cars(session: &Session, limit: Option<usize>, as_json: bool) -> Result<(), CliError> {
    let mut query = session.store.collection::<Car>().query();
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    let cars = query.fetch().await?;

    if as_json {
        let items = cars.iter().map(car_to_list_item).collect::<Vec<CarListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_car_lines(&cars) {
            println!("{line}");
        }
    }

    Ok(())
}

/// Show a car, hydrating it from the server first when reachable
pub async fn run_car(session: &Session, id: &str, as_json: bool) -> Result<(), CliError> {
    let detail = match session.gateway() {
        Ok(gateway) => {
            let monitor = session.connectivity(&gateway).await;
            DetailRefresher::new(session.store.clone(), gateway, monitor)
                .show(id)
                .await?
        }
        Err(error) => {
            tracing::debug!("Showing cached car only: {}", error);
            session
                .store
                .collection::<Car>()
                .find(id)
                .await?
                .map(|car| CarDetail {
                    car,
                    source: DetailSource::Cached,
                })
        }
    };

    let Some(detail) = detail else {
        return Err(CliError::CarNotFound(id.to_string()));
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&detail.car)?);
        return Ok(());
    }

    for line in format_car_detail(&detail.car, detail.source) {
        println!("{line}");
    }
    if detail.source == DetailSource::Cached {
        println!();
        println!("(showing cached data)");
    }
    Ok(())
}
