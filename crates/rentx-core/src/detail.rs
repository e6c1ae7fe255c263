//! Car detail refresh: a live side read that hydrates the replica.
//!
//! Independent of sync rounds. A failed or skipped fetch falls back to the
//! cached projection. Only cars already in the replica are written back;
//! the replica's membership is decided by pulls alone.

use crate::connectivity::ConnectivityMonitor;
use crate::error::Result;
use crate::models::Car;
use crate::remote::RemoteGateway;
use crate::store::LocalStore;

/// Where a displayed car came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    /// Fetched just now and written to the replica
    Live,
    /// Served from the replica
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarDetail {
    pub car: Car,
    pub source: DetailSource,
}

pub struct DetailRefresher<G> {
    store: LocalStore,
    gateway: G,
    connectivity: ConnectivityMonitor,
}

impl<G: RemoteGateway> DetailRefresher<G> {
    pub const fn new(store: LocalStore, gateway: G, connectivity: ConnectivityMonitor) -> Self {
        Self {
            store,
            gateway,
            connectivity,
        }
    }

    /// Show a car, fetching its full detail first when online
    ///
    /// Returns `None` only when the car is neither cached nor fetchable.
    /// Gateway failures are logged, never surfaced.
    pub async fn show(&self, car_id: &str) -> Result<Option<CarDetail>> {
        if self.connectivity.is_connected() {
            match self.gateway.fetch_detail(car_id).await {
                Ok(car) => {
                    self.store.hydrate_car(&car).await?;
                    return Ok(Some(CarDetail {
                        car,
                        source: DetailSource::Live,
                    }));
                }
                Err(error) => {
                    tracing::warn!("Detail fetch for car {} failed: {}", car_id, error);
                }
            }
        }

        let cached = self.store.collection::<Car>().find(car_id).await?;
        Ok(cached.map(|car| CarDetail {
            car,
            source: DetailSource::Cached,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connectivity::Connectivity;
    use crate::models::car::fixtures::car;
    use crate::models::{Accessory, ChangeSet, Checkpoint, TableChanges};
    use crate::sync::testing::FakeGateway;
    use pretty_assertions::assert_eq;

    fn detailed(id: &str) -> Car {
        Car {
            accessories: Some(vec![Accessory {
                id: format!("{id}-speed"),
                kind: "speed".to_string(),
                name: "235 km/h".to_string(),
            }]),
            ..car(id, "Audi RS 5")
        }
    }

    async fn store_with(cars: Vec<Car>) -> LocalStore {
        let store = LocalStore::open_in_memory().unwrap();
        let changes = ChangeSet {
            cars: TableChanges {
                created: cars,
                ..TableChanges::default()
            },
            ..ChangeSet::default()
        };
        store.apply_changes(&changes, Checkpoint::new(1)).await.unwrap();
        store
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn online_fetch_hydrates_the_replica() {
        let store = store_with(vec![car("car-a", "Audi RS 5")]).await;
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_detail(detailed("car-a"));
        let refresher = DetailRefresher::new(
            store.clone(),
            Arc::clone(&gateway),
            ConnectivityMonitor::new(Connectivity::Connected),
        );

        let detail = refresher.show("car-a").await.unwrap().unwrap();

        assert_eq!(detail.source, DetailSource::Live);
        let cached = store.collection::<Car>().find("car-a").await.unwrap().unwrap();
        assert_eq!(cached.accessories.unwrap().len(), 1);
        assert_eq!(store.checkpoint().await.unwrap(), Checkpoint::new(1));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn live_detail_of_uncached_car_is_not_stored() {
        let store = LocalStore::open_in_memory().unwrap();
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_detail(detailed("car-a"));
        let refresher = DetailRefresher::new(
            store.clone(),
            Arc::clone(&gateway),
            ConnectivityMonitor::new(Connectivity::Connected),
        );

        let detail = refresher.show("car-a").await.unwrap().unwrap();

        assert_eq!(detail.source, DetailSource::Live);
        assert!(store.collection::<Car>().find("car-a").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_serves_cache_without_network() {
        let store = store_with(vec![car("car-a", "Audi RS 5")]).await;
        let gateway = Arc::new(FakeGateway::new());
        let refresher = DetailRefresher::new(
            store,
            Arc::clone(&gateway),
            ConnectivityMonitor::new(Connectivity::Disconnected),
        );

        let detail = refresher.show("car-a").await.unwrap().unwrap();

        assert_eq!(detail.source, DetailSource::Cached);
        assert_eq!(detail.car.name, "Audi RS 5");
        assert_eq!(gateway.detail_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_fetch_falls_back_to_cache() {
        let store = store_with(vec![car("car-a", "Audi RS 5")]).await;
        let gateway = Arc::new(FakeGateway::new());
        let refresher = DetailRefresher::new(
            store,
            Arc::clone(&gateway),
            ConnectivityMonitor::new(Connectivity::Connected),
        );

        let detail = refresher.show("car-a").await.unwrap().unwrap();

        assert_eq!(detail.source, DetailSource::Cached);
        assert_eq!(gateway.detail_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_car_offline_is_none() {
        let store = LocalStore::open_in_memory().unwrap();
        let refresher = DetailRefresher::new(
            store,
            Arc::new(FakeGateway::new()),
            ConnectivityMonitor::default(),
        );

        assert!(refresher.show("missing").await.unwrap().is_none());
    }
}
