//! Assembled journey itineraries as returned to API clients.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::journey::{Journey, TrainNumber, TrainType};
use super::station::Station;
use super::stop::{StopDetail, StopStatus};
use super::time::minutes_between;

/// One resolved stop of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStop {
    pub station: Station,
    /// Planned arrival.
    pub arrival: Option<NaiveDateTime>,
    /// Actual minus planned arrival, in whole minutes.
    pub arrival_delay: Option<i64>,
    /// Planned departure.
    pub departure: Option<NaiveDateTime>,
    pub departure_delay: Option<i64>,
    /// Planned platform.
    pub platform: Option<String>,
    /// Actual platform, when it differs from the planned one.
    pub changed_platform: Option<String>,
    pub ordinal: u32,
    pub status: StopStatus,
}

/// Delay in minutes between a planned time and the matching actual time.
///
/// `None` unless both the planned time and an actual detail carrying that
/// time exist.
pub fn delay_minutes(
    planned: Option<NaiveDateTime>,
    actual: Option<NaiveDateTime>,
) -> Option<i64> {
    Some(minutes_between(planned?, actual?))
}

impl ApiStop {
    /// Build a stop from its station and planned/actual details.
    pub fn resolve(
        station: Station,
        ordinal: u32,
        planned: &StopDetail,
        actual: Option<&StopDetail>,
    ) -> Self {
        let arrival_delay = delay_minutes(planned.arrival, actual.and_then(|a| a.arrival));
        let departure_delay =
            delay_minutes(planned.departure, actual.and_then(|a| a.departure));

        let changed_platform = actual
            .and_then(|a| a.platform.as_ref())
            .filter(|p| planned.platform.as_ref() != Some(*p))
            .cloned();

        let status = actual.map(|a| a.status).unwrap_or_default();

        Self {
            station,
            arrival: planned.arrival,
            arrival_delay,
            departure: planned.departure,
            departure_delay,
            platform: planned.platform.clone(),
            changed_platform,
            ordinal,
            status,
        }
    }

    /// The time used to place this stop on a calendar day: arrival if
    /// known, otherwise departure.
    pub fn reference_time(&self) -> Option<NaiveDateTime> {
        self.arrival.or(self.departure)
    }
}

/// Where an itinerary starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Origin {
    pub station: Station,
    pub departure: Option<NaiveDateTime>,
}

/// Where an itinerary ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub station: Station,
    pub arrival: Option<NaiveDateTime>,
}

/// A journey with its ordered, resolved stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub train_type: TrainType,
    pub train_number: TrainNumber,
    pub line: Option<String>,
    pub start: NaiveDateTime,
    pub origin: Origin,
    pub destination: Destination,
    pub stops: Vec<ApiStop>,
    /// Stops dropped because their station or planned detail was missing.
    pub skipped_stops: usize,
}

impl Itinerary {
    /// Assemble an itinerary from resolved stops.
    ///
    /// Stops are sorted by ordinal. Returns `None` when no stop resolved.
    pub fn assemble(journey: &Journey, mut stops: Vec<ApiStop>, skipped_stops: usize) -> Option<Self> {
        stops.sort_by_key(|s| s.ordinal);

        let first = stops.first()?;
        let last = stops.last()?;

        let origin = Origin {
            station: first.station.clone(),
            departure: first.departure,
        };
        let destination = Destination {
            station: last.station.clone(),
            arrival: last.arrival,
        };

        Some(Self {
            train_type: journey.train_type.clone(),
            train_number: journey.train_number,
            line: journey.line.clone(),
            start: journey.key.start,
            origin,
            destination,
            stops,
            skipped_stops,
        })
    }
}
