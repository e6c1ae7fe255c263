use chrono::NaiveDate;
use rentx_core::models::RentalRequest;
use rentx_core::DetailRefresher;

use crate::commands::common::Session;
use crate::error::CliError;

/// Book a car; unlike browsing this needs the server
///
/// The car is refreshed from `/cars/{id}` first so the total uses the
/// current daily price. The cached row is only used if that fetch fails.
pub async fn run_rent(
    session: &Session,
    car_id: &str,
    user_id: &str,
    dates: &[NaiveDate],
) -> Result<RentalRequest, CliError> {
    let gateway = session.gateway()?;
    let monitor = session.connectivity(&gateway).await;
    if !monitor.is_connected() {
        return Err(CliError::Offline("Renting a car"));
    }

    let detail = DetailRefresher::new(session.store.clone(), gateway.clone(), monitor)
        .show(car_id)
        .await?
        .ok_or_else(|| CliError::CarNotFound(car_id.to_string()))?;
    let car = detail.car;
    let rental = RentalRequest::for_dates(user_id, &car, dates)?;

    gateway.create_rental(&rental).await?;
    println!(
        "Rented {} {} for {}: R$ {:.2}",
        car.brand,
        car.name,
        rental.period_label(),
        rental.total
    );
    Ok(rental)
}
