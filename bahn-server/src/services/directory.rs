//! Station lookups.
//!
//! Exact-key lookups (EVA, DS100) treat absence as an error. Name-prefix
//! search treats absence as an empty result.

use std::collections::HashMap;

use crate::domain::{Ds100, Eva, Location, Station};
use crate::store::{RailStore, StationRecord};

use super::error::ServiceError;

impl From<StationRecord> for Station {
    fn from(record: StationRecord) -> Self {
        Station {
            eva: record.eva,
            name: record.name,
            ds100: record.ds100,
            location: Location::from_parts(record.latitude, record.longitude),
        }
    }
}

/// Station lookups against the store.
pub struct StationDirectory<'a, S> {
    store: &'a S,
}

impl<'a, S: RailStore> StationDirectory<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The station with the given EVA number.
    pub async fn by_eva(&self, eva: Eva) -> Result<Station, ServiceError> {
        self.store
            .stations_by_eva(eva)
            .await?
            .into_iter()
            .next()
            .map(Station::from)
            .ok_or_else(|| ServiceError::StationNotFound(format!("EVA {eva}")))
    }

    /// The station with the given DS100 code.
    pub async fn by_ds100(&self, ds100: &Ds100) -> Result<Station, ServiceError> {
        self.store
            .stations_by_ds100(ds100)
            .await?
            .into_iter()
            .next()
            .map(Station::from)
            .ok_or_else(|| ServiceError::StationNotFound(format!("DS100 {ds100}")))
    }

    /// All stations whose name starts with `prefix`. Empty if none match.
    pub async fn by_name_prefix(&self, prefix: &str) -> Result<Vec<Station>, ServiceError> {
        Ok(self
            .store
            .stations_by_name_prefix(prefix)
            .await?
            .into_iter()
            .map(Station::from)
            .collect())
    }

    /// Every station.
    pub async fn all(&self) -> Result<Vec<Station>, ServiceError> {
        Ok(self
            .store
            .all_stations()
            .await?
            .into_iter()
            .map(Station::from)
            .collect())
    }
}

/// EVA → station lookup over a station list.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    by_eva: HashMap<Eva, Station>,
}

impl StationIndex {
    pub fn new(stations: &[Station]) -> Self {
        Self {
            by_eva: stations.iter().map(|s| (s.eva, s.clone())).collect(),
        }
    }

    pub fn get(&self, eva: Eva) -> Option<&Station> {
        self.by_eva.get(&eva)
    }

    pub fn len(&self) -> usize {
        self.by_eva.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_eva.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frankfurt_network, record};

    #[tokio::test]
    async fn by_eva_finds_station() {
        let store = frankfurt_network();
        let directory = StationDirectory::new(&store);

        let station = directory.by_eva(Eva::new(8000105).unwrap()).await.unwrap();
        assert_eq!(station.ds100.as_str(), "FF");
        assert!(station.location.is_some());
    }

    #[tokio::test]
    async fn exact_lookups_fail_when_missing() {
        let store = frankfurt_network();
        let directory = StationDirectory::new(&store);

        let err = directory.by_eva(Eva::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, ServiceError::StationNotFound(_)));

        let err = directory
            .by_ds100(&Ds100::parse("XX").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StationNotFound(_)));
    }

    #[tokio::test]
    async fn prefix_search_returns_empty_when_missing() {
        let store = frankfurt_network();
        let directory = StationDirectory::new(&store);

        let matches = directory.by_name_prefix("Zzz").await.unwrap();
        assert!(matches.is_empty());

        let matches = directory.by_name_prefix("mann").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].ds100.as_str(), "RM");
    }

    #[test]
    fn conversion_drops_half_location() {
        let mut half = record(8000001, "XA", "Half", Some(50.0), Some(8.0));
        half.longitude = None;
        assert!(Station::from(half).location.is_none());

        let full = record(8000002, "XB", "Full", Some(50.0), Some(8.0));
        let station = Station::from(full);
        assert_eq!(
            station.location,
            Some(Location {
                latitude: 50.0,
                longitude: 8.0
            })
        );
    }

    #[test]
    fn index_lookup() {
        let stations: Vec<Station> = vec![
            record(8000105, "FF", "Frankfurt(Main)Hbf", None, None).into(),
            record(8000244, "RM", "Mannheim Hbf", None, None).into(),
        ];
        let index = StationIndex::new(&stations);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(Eva::new(8000244).unwrap()).unwrap().name,
            "Mannheim Hbf"
        );
        assert!(index.get(Eva::new(1).unwrap()).is_none());
    }
}
