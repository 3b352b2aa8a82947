//! Read access to the relational rail data store.
//!
//! The store holds normalized stations, journeys, stops and stop details.
//! Nothing in this crate writes to it. [`RailStore`] lists every query the
//! services issue; [`MySqlStore`] runs them against MariaDB/MySQL through a
//! bounded connection pool and [`MemoryStore`] serves them from vectors for
//! tests and local development.

mod error;
mod memory;
mod mysql;

use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::{
    Ds100, Eva, Journey, JourneyKey, ObservedStop, Stop, StopDetail, TrainNumber, TrainType,
};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mysql::{MySqlStore, MySqlStoreConfig};

/// A station as stored, including raw coordinates.
///
/// Either coordinate may be missing independently; the public
/// [`Station`](crate::domain::Station) shape only carries a location when
/// both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub id: i64,
    pub eva: Eva,
    pub name: String,
    pub ds100: Ds100,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Row counts over the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub stops: u64,
    pub stations: u64,
    pub journeys: u64,
    pub cancelled: u64,
}

/// Read-only queries against the rail data store.
///
/// Each call acquires at most one pooled connection and releases it before
/// returning. Empty results are `Ok`; absence is interpreted by the caller.
pub trait RailStore: Send + Sync {
    /// Every station.
    fn all_stations(&self) -> impl Future<Output = Result<Vec<StationRecord>, StoreError>> + Send;

    /// Stations with the given EVA number.
    fn stations_by_eva(
        &self,
        eva: Eva,
    ) -> impl Future<Output = Result<Vec<StationRecord>, StoreError>> + Send;

    /// Stations with the given DS100 code.
    fn stations_by_ds100(
        &self,
        ds100: &Ds100,
    ) -> impl Future<Output = Result<Vec<StationRecord>, StoreError>> + Send;

    /// Stations whose name starts with `prefix` (case-insensitive).
    fn stations_by_name_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<StationRecord>, StoreError>> + Send;

    /// Journeys of a train whose `start` lies in `[from, to)`.
    fn journeys_starting_between(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<Journey>, StoreError>> + Send;

    /// All journeys of a train, most recent first.
    fn journeys_of_train(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
    ) -> impl Future<Output = Result<Vec<Journey>, StoreError>> + Send;

    /// A single journey occurrence.
    fn journey(
        &self,
        key: &JourneyKey,
    ) -> impl Future<Output = Result<Option<Journey>, StoreError>> + Send;

    /// Stops of a journey, ordered by ordinal ascending.
    fn stops_of_journey(
        &self,
        key: &JourneyKey,
    ) -> impl Future<Output = Result<Vec<Stop>, StoreError>> + Send;

    /// A stop detail by id.
    fn stop_detail(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<StopDetail>, StoreError>> + Send;

    /// Stops at a station whose planned arrival (or, lacking one, planned
    /// departure) lies in `[from, to)`.
    fn stops_at_station_between(
        &self,
        station: Eva,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<Stop>, StoreError>> + Send;

    /// Stops at a station of journeys starting in `[from, to]`, joined with
    /// train identity and planned/actual times.
    fn observed_stops_at(
        &self,
        station: Eva,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<ObservedStop>, StoreError>> + Send;

    /// The stop at `ordinal` of a journey, joined like
    /// [`observed_stops_at`](Self::observed_stops_at).
    fn observed_stop(
        &self,
        journey: &JourneyKey,
        ordinal: u32,
    ) -> impl Future<Output = Result<Option<ObservedStop>, StoreError>> + Send;

    /// Row counts for the statistics endpoint.
    fn counts(&self) -> impl Future<Output = Result<StoreCounts, StoreError>> + Send;
}
