//! Car model

use serde::{Deserialize, Serialize};

/// Shown in place of a price the replica does not know yet
pub const PRICE_PLACEHOLDER: &str = "--";

/// A car accessory (e.g. speed, acceleration, seats)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: String,
    /// Accessory category used by the client to pick an icon
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// A single photo in a car's gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarPhoto {
    pub id: String,
    pub photo: String,
}

/// Locally cached projection of a rentable car
///
/// `accessories` and `photos` are only present once a live detail fetch has
/// hydrated them; the sync pull carries the list-level fields only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub about: String,
    /// Rent period label, e.g. "Ao dia"
    #[serde(default)]
    pub period: String,
    /// Daily rate
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessories: Option<Vec<Accessory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<CarPhoto>>,
}

impl Car {
    /// Formatted daily price, or the placeholder when the price is unknown
    #[must_use]
    pub fn price_label(&self) -> String {
        self.price.map_or_else(
            || PRICE_PLACEHOLDER.to_string(),
            |price| format!("R$ {price}"),
        )
    }

    /// Photo URLs for the gallery, falling back to the thumbnail
    #[must_use]
    pub fn gallery(&self) -> Vec<String> {
        match &self.photos {
            Some(photos) if !photos.is_empty() => {
                photos.iter().map(|photo| photo.photo.clone()).collect()
            }
            _ => vec![self.thumbnail.clone()],
        }
    }

    /// Whether a detail fetch has filled in accessories and photos
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.accessories.is_some() && self.photos.is_some()
    }

    /// Total rent for the given number of days
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rental_total(&self, days: usize) -> Option<f64> {
        self.price.map(|price| price * days as f64)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn car(id: &str, name: &str) -> Car {
        Car {
            id: id.to_string(),
            name: name.to_string(),
            brand: "Audi".to_string(),
            about: "Fast".to_string(),
            period: "Ao dia".to_string(),
            price: Some(120.0),
            fuel_type: "gasoline_motor".to_string(),
            thumbnail: format!("https://cdn.rentx.dev/{id}.png"),
            accessories: None,
            photos: None,
        }
    }
}
