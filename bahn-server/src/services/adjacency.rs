//! Adjacent-station extraction for a single station.
//!
//! Every stop made at the station inside the observation window is paired
//! with the stop before and after it in the same journey. Each pairing
//! yields a planned and an actual travel time to the neighboring station;
//! these are averaged per neighbor.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use futures::future::try_join;
use tracing::{debug, trace, warn};

use crate::domain::distance::station_distance_km;
use crate::domain::time::minutes_between;
use crate::domain::{Eva, NeighborConnection, ObservedStop, Station, StationConnections};
use crate::store::RailStore;

use super::directory::StationIndex;
use super::error::ServiceError;

/// Error returned when a window ends before it starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("observation window ends ({end}) before it starts ({start})")]
pub struct InvalidWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

/// Inclusive range of journey start times considered for adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ObservationWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, InvalidWindow> {
        if end < start {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Travel time between two consecutive stops of one journey, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelSample {
    pub planned: i64,
    pub actual: i64,
}

impl TravelSample {
    /// Travel time from departing `from` to arriving at `to`.
    ///
    /// Actual times fall back to planned ones independently on each side.
    /// Returns `None` if either planned time is missing.
    pub fn between(from: &ObservedStop, to: &ObservedStop) -> Option<Self> {
        let planned_departure = from.planned.departure?;
        let planned_arrival = to.planned.arrival?;

        let actual_departure = from.actual.departure.unwrap_or(planned_departure);
        let actual_arrival = to.actual.arrival.unwrap_or(planned_arrival);

        Some(Self {
            planned: minutes_between(planned_departure, planned_arrival),
            actual: minutes_between(actual_departure, actual_arrival),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    planned_sum: i64,
    actual_sum: i64,
    count: u32,
}

/// Running per-neighbor sums of travel samples.
#[derive(Debug, Default)]
pub struct NeighborAccumulator {
    buckets: BTreeMap<Eva, Bucket>,
}

impl NeighborAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample towards `neighbor`.
    pub fn record(&mut self, neighbor: Eva, sample: TravelSample) {
        let bucket = self.buckets.entry(neighbor).or_default();
        bucket.planned_sum += sample.planned;
        bucket.actual_sum += sample.actual;
        bucket.count += 1;
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Average every bucket and attach distance from `origin`.
    ///
    /// Neighbors missing from `stations` are dropped.
    pub fn finish(self, origin: &Station, stations: &StationIndex) -> Vec<NeighborConnection> {
        self.buckets
            .into_iter()
            .filter_map(|(eva, bucket)| {
                let Some(neighbor) = stations.get(eva) else {
                    warn!(origin = %origin.eva, neighbor = %eva, "neighbor station unknown, dropping");
                    return None;
                };

                Some(NeighborConnection {
                    station: neighbor.clone(),
                    average_planned_time: mean_minutes(bucket.planned_sum, bucket.count),
                    average_actual_time: mean_minutes(bucket.actual_sum, bucket.count),
                    used_stops: bucket.count,
                    distance: station_distance_km(origin, neighbor),
                })
            })
            .collect()
    }
}

/// Arithmetic mean rounded to the nearest whole minute, halves up.
fn mean_minutes(sum: i64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (sum as f64 / f64::from(count) + 0.5).floor()
}

/// Extracts a station's neighbors from observed journeys.
pub struct AdjacencyExtractor<'a, S> {
    store: &'a S,
    window: ObservationWindow,
}

impl<'a, S: RailStore> AdjacencyExtractor<'a, S> {
    pub fn new(store: &'a S, window: ObservationWindow) -> Self {
        Self { store, window }
    }

    async fn previous(&self, stop: &ObservedStop) -> Result<Option<ObservedStop>, ServiceError> {
        let Some(ordinal) = stop.ordinal.checked_sub(1) else {
            return Ok(None);
        };
        Ok(self.store.observed_stop(&stop.journey, ordinal).await?)
    }

    async fn next(&self, stop: &ObservedStop) -> Result<Option<ObservedStop>, ServiceError> {
        Ok(self
            .store
            .observed_stop(&stop.journey, stop.ordinal + 1)
            .await?)
    }

    /// Neighbors of `station` with averaged travel times.
    ///
    /// `stations` resolves neighbor EVA numbers to station records.
    pub async fn connections_of(
        &self,
        station: &Station,
        stations: &StationIndex,
    ) -> Result<StationConnections, ServiceError> {
        let observations = self
            .store
            .observed_stops_at(station.eva, self.window.start, self.window.end)
            .await?;

        let mut accumulator = NeighborAccumulator::new();

        for stop in &observations {
            let (previous, next) = try_join(self.previous(stop), self.next(stop)).await?;

            if previous.is_none() && next.is_none() {
                trace!(journey = %stop.journey.id, ordinal = stop.ordinal, "stop has no neighbors");
                continue;
            }

            if let Some(previous) = previous {
                match TravelSample::between(&previous, stop) {
                    Some(sample) => accumulator.record(previous.station, sample),
                    None => trace!(journey = %stop.journey.id, "missing planned times towards previous stop"),
                }
            }

            if let Some(next) = next {
                match TravelSample::between(stop, &next) {
                    Some(sample) => accumulator.record(next.station, sample),
                    None => trace!(journey = %stop.journey.id, "missing planned times towards next stop"),
                }
            }
        }

        debug!(
            station = %station.ds100,
            stops = observations.len(),
            neighbors = accumulator.len(),
            "extracted adjacency"
        );

        Ok(StationConnections {
            station: station.clone(),
            used_stops: observations.len(),
            connecting_stations: accumulator.finish(station, stations),
        })
    }
}
