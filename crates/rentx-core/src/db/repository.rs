//! Car repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use crate::error::Result;
use crate::models::{Accessory, Car, CarPhoto};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

/// Trait for car storage operations
pub trait CarRepository {
    /// Get a car by ID
    fn get(&self, id: &str) -> Result<Option<Car>>;

    /// List cars ordered by name
    fn list(&self, limit: Option<usize>) -> Result<Vec<Car>>;

    /// Insert or replace a car's list-level fields
    ///
    /// Accessories and photos are only overwritten when the incoming record
    /// carries them, so a pull never erases a hydrated detail.
    fn upsert(&self, car: &Car) -> Result<()>;

    /// Overwrite an existing car with a fetched detail
    ///
    /// Never inserts: a car missing from the replica stays missing, so a
    /// detail fetch racing a pulled delete cannot bring the row back.
    fn hydrate(&self, car: &Car) -> Result<bool>;

    /// Delete a car, returning whether a row existed
    fn delete(&self, id: &str) -> Result<bool>;

    /// Count cars in the replica
    fn count(&self) -> Result<usize>;
}

/// `SQLite` implementation of `CarRepository`
pub struct SqliteCarRepository<'a> {
    conn: &'a Connection,
}

const SELECT_CARS: &str = "SELECT id, name, brand, about, period, price, fuel_type, thumbnail, accessories, photos FROM cars";

impl<'a> SqliteCarRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a car from a database row
    fn parse_car(row: &rusqlite::Row<'_>) -> rusqlite::Result<Car> {
        Ok(Car {
            id: row.get(0)?,
            name: row.get(1)?,
            brand: row.get(2)?,
            about: row.get(3)?,
            period: row.get(4)?,
            price: row.get(5)?,
            fuel_type: row.get(6)?,
            thumbnail: row.get(7)?,
            accessories: parse_json_column::<Vec<Accessory>>(row, 8)?,
            photos: parse_json_column::<Vec<CarPhoto>>(row, 9)?,
        })
    }
}

fn parse_json_column<T: DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let Some(raw) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(error)))
}

fn to_json_column<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

impl CarRepository for SqliteCarRepository<'_> {
    fn get(&self, id: &str) -> Result<Option<Car>> {
        let car = self
            .conn
            .query_row(
                &format!("{SELECT_CARS} WHERE id = ?"),
                params![id],
                Self::parse_car,
            )
            .optional()?;
        Ok(car)
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<Car>> {
        let limit = limit.map_or(-1, |limit| limit as i64);
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_CARS} ORDER BY name ASC, id ASC LIMIT ?"))?;

        let cars = stmt
            .query_map(params![limit], Self::parse_car)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(cars)
    }

    fn upsert(&self, car: &Car) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cars (id, name, brand, about, period, price, fuel_type, thumbnail, accessories, photos)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                about = excluded.about,
                period = excluded.period,
                price = excluded.price,
                fuel_type = excluded.fuel_type,
                thumbnail = excluded.thumbnail,
                accessories = COALESCE(excluded.accessories, cars.accessories),
                photos = COALESCE(excluded.photos, cars.photos)",
            params![
                car.id,
                car.name,
                car.brand,
                car.about,
                car.period,
                car.price,
                car.fuel_type,
                car.thumbnail,
                to_json_column(car.accessories.as_ref())?,
                to_json_column(car.photos.as_ref())?,
            ],
        )?;
        Ok(())
    }

    fn hydrate(&self, car: &Car) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE cars SET
                name = ?2,
                brand = ?3,
                about = ?4,
                period = ?5,
                price = ?6,
                fuel_type = ?7,
                thumbnail = ?8,
                accessories = COALESCE(?9, accessories),
                photos = COALESCE(?10, photos)
             WHERE id = ?1",
            params![
                car.id,
                car.name,
                car.brand,
                car.about,
                car.period,
                car.price,
                car.fuel_type,
                car.thumbnail,
                to_json_column(car.accessories.as_ref())?,
                to_json_column(car.photos.as_ref())?,
            ],
        )?;
        Ok(rows > 0)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM cars WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))?;
        Ok(count)
    }
}
