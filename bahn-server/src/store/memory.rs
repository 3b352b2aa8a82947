//! In-memory store for tests and development without a database.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::domain::{
    Ds100, Eva, Journey, JourneyKey, ObservedStop, Stop, StopDetail, StopStatus, StopTimes,
    TrainNumber, TrainType,
};

use super::error::StoreError;
use super::{RailStore, StationRecord, StoreCounts};

/// A store backed by plain vectors.
///
/// Queries scan everything, which is fine for fixture-sized data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stations: Vec<StationRecord>,
    journeys: Vec<Journey>,
    stops: Vec<Stop>,
    details: HashMap<String, StopDetail>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station record.
    pub fn add_station(&mut self, record: StationRecord) {
        self.stations.push(record);
    }

    /// Add a journey.
    pub fn add_journey(&mut self, journey: Journey) {
        self.journeys.push(journey);
    }

    /// Add a stop without registering any details for it.
    pub fn add_stop(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    /// Register a stop detail under `id`.
    pub fn add_detail(&mut self, id: impl Into<String>, detail: StopDetail) {
        self.details.insert(id.into(), detail);
    }

    /// Add a stop together with its planned and optional actual detail.
    ///
    /// Detail ids are derived from the journey id and ordinal.
    pub fn add_call(
        &mut self,
        journey: &JourneyKey,
        ordinal: u32,
        station: Eva,
        planned: StopDetail,
        actual: Option<StopDetail>,
    ) {
        let stop_id = format!("{}-{}-{}", journey.id, journey.start, ordinal);
        let planned_id = format!("{stop_id}-planned");
        let actual_id = actual.as_ref().map(|_| format!("{stop_id}-actual"));

        self.add_detail(planned_id.clone(), planned);
        if let (Some(id), Some(detail)) = (&actual_id, actual) {
            self.add_detail(id.clone(), detail);
        }

        self.add_stop(Stop {
            id: stop_id,
            journey: journey.clone(),
            ordinal,
            station,
            planned_detail_id: planned_id,
            actual_detail_id: actual_id,
        });
    }

    fn find_journey(&self, key: &JourneyKey) -> Option<&Journey> {
        self.journeys.iter().find(|j| &j.key == key)
    }

    fn observe(&self, stop: &Stop) -> Option<ObservedStop> {
        let journey = self.find_journey(&stop.journey)?;
        let planned = self.details.get(&stop.planned_detail_id)?;
        let actual = stop
            .actual_detail_id
            .as_ref()
            .and_then(|id| self.details.get(id));

        Some(ObservedStop {
            journey: stop.journey.clone(),
            ordinal: stop.ordinal,
            station: stop.station,
            train_type: journey.train_type.clone(),
            train_number: journey.train_number,
            planned: StopTimes {
                arrival: planned.arrival,
                departure: planned.departure,
            },
            actual: StopTimes {
                arrival: actual.and_then(|a| a.arrival),
                departure: actual.and_then(|a| a.departure),
            },
        })
    }

    fn planned_time(&self, stop: &Stop) -> Option<NaiveDateTime> {
        let planned = self.details.get(&stop.planned_detail_id)?;
        planned.arrival.or(planned.departure)
    }
}

impl RailStore for MemoryStore {
    async fn all_stations(&self) -> Result<Vec<StationRecord>, StoreError> {
        Ok(self.stations.clone())
    }

    async fn stations_by_eva(&self, eva: Eva) -> Result<Vec<StationRecord>, StoreError> {
        Ok(self
            .stations
            .iter()
            .filter(|s| s.eva == eva)
            .cloned()
            .collect())
    }

    async fn stations_by_ds100(&self, ds100: &Ds100) -> Result<Vec<StationRecord>, StoreError> {
        Ok(self
            .stations
            .iter()
            .filter(|s| &s.ds100 == ds100)
            .cloned()
            .collect())
    }

    async fn stations_by_name_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<StationRecord>, StoreError> {
        let prefix = prefix.to_lowercase();
        Ok(self
            .stations
            .iter()
            .filter(|s| s.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn journeys_starting_between(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Journey>, StoreError> {
        Ok(self
            .journeys
            .iter()
            .filter(|j| &j.train_type == train_type && j.train_number == train_number)
            .filter(|j| j.key.start >= from && j.key.start < to)
            .cloned()
            .collect())
    }

    async fn journeys_of_train(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
    ) -> Result<Vec<Journey>, StoreError> {
        let mut journeys: Vec<Journey> = self
            .journeys
            .iter()
            .filter(|j| &j.train_type == train_type && j.train_number == train_number)
            .cloned()
            .collect();
        journeys.sort_by(|a, b| b.key.start.cmp(&a.key.start));
        Ok(journeys)
    }

    async fn journey(&self, key: &JourneyKey) -> Result<Option<Journey>, StoreError> {
        Ok(self.find_journey(key).cloned())
    }

    async fn stops_of_journey(&self, key: &JourneyKey) -> Result<Vec<Stop>, StoreError> {
        let mut stops: Vec<Stop> = self
            .stops
            .iter()
            .filter(|s| &s.journey == key)
            .cloned()
            .collect();
        stops.sort_by_key(|s| s.ordinal);
        Ok(stops)
    }

    async fn stop_detail(&self, id: &str) -> Result<Option<StopDetail>, StoreError> {
        Ok(self.details.get(id).cloned())
    }

    async fn stops_at_station_between(
        &self,
        station: Eva,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Stop>, StoreError> {
        Ok(self
            .stops
            .iter()
            .filter(|s| s.station == station)
            .filter(|s| {
                self.planned_time(s)
                    .is_some_and(|t| t >= from && t < to)
            })
            .cloned()
            .collect())
    }

    async fn observed_stops_at(
        &self,
        station: Eva,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<ObservedStop>, StoreError> {
        Ok(self
            .stops
            .iter()
            .filter(|s| s.station == station)
            .filter(|s| s.journey.start >= from && s.journey.start <= to)
            .filter_map(|s| self.observe(s))
            .collect())
    }

    async fn observed_stop(
        &self,
        journey: &JourneyKey,
        ordinal: u32,
    ) -> Result<Option<ObservedStop>, StoreError> {
        Ok(self
            .stops
            .iter()
            .find(|s| &s.journey == journey && s.ordinal == ordinal)
            .and_then(|s| self.observe(s)))
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let cancelled = self
            .details
            .values()
            .filter(|d| d.status == StopStatus::Cancelled)
            .count();

        Ok(StoreCounts {
            stops: self.stops.len() as u64,
            stations: self.stations.len() as u64,
            journeys: self.journeys.len() as u64,
            cancelled: cancelled as u64,
        })
    }
}
