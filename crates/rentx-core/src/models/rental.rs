//! Rental request model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Car;

/// Body of `POST /rentals`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRequest {
    pub user_id: String,
    pub car_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: f64,
}

impl RentalRequest {
    /// Build a rental for the selected days
    ///
    /// Dates are sorted and deduplicated; the total is one daily rate per
    /// selected day. A car without a known price cannot be rented.
    pub fn for_dates(user_id: &str, car: &Car, dates: &[NaiveDate]) -> Result<Self> {
        let mut days = dates.to_vec();
        days.sort_unstable();
        days.dedup();

        let (Some(start_date), Some(end_date)) = (days.first(), days.last()) else {
            return Err(Error::InvalidInput(
                "select at least one rental day".to_string(),
            ));
        };
        let total = car.rental_total(days.len()).ok_or_else(|| {
            Error::InvalidInput(format!("price for car {} is not known yet", car.id))
        })?;

        Ok(Self {
            user_id: user_id.to_string(),
            car_id: car.id.clone(),
            start_date: *start_date,
            end_date: *end_date,
            total,
        })
    }

    /// Period formatted the way the scheduling screen shows it
    #[must_use]
    pub fn period_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%d/%m/%Y"),
            self.end_date.format("%d/%m/%Y")
        )
    }
}
