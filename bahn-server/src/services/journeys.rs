//! Journey resolution: itineraries, service dates and station departures.
//!
//! A journey is found by train type, train number and the calendar day its
//! `start` falls on. Its stops are resolved one by one; a stop whose
//! station or planned detail is missing is skipped and counted rather than
//! failing the whole itinerary.

use std::pin::pin;

use chrono::{NaiveDate, NaiveDateTime};
use futures::{StreamExt, stream};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::time::day_bounds;
use crate::domain::{
    ApiStop, Ds100, Eva, Itinerary, Journey, Station, Stop, TrainNumber, TrainType,
};
use crate::store::RailStore;

use super::directory::{StationDirectory, StationIndex};
use super::error::ServiceError;

/// One occurrence of a train, with its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyDate {
    pub start: NaiveDateTime,
    pub line: Option<String>,
    pub origin: Option<Station>,
    pub destination: Option<Station>,
    pub stop_count: usize,
}

/// All occurrences of a train, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyDates {
    #[serde(rename = "type")]
    pub train_type: TrainType,
    #[serde(rename = "number")]
    pub train_number: TrainNumber,
    pub count: usize,
    pub dates: Vec<JourneyDate>,
}

/// A journey calling at a station, summarized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneySummary {
    pub train_type: TrainType,
    pub train_number: TrainNumber,
    pub line: Option<String>,
    pub start: NaiveDateTime,
    pub origin: Option<Station>,
    pub destination: Option<Station>,
    pub stop_count: usize,
}

/// Journeys calling at a station on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationJourneys {
    pub station: Station,
    pub count: usize,
    pub journeys: Vec<JourneySummary>,
}

/// Resolves journeys and itineraries from the store.
pub struct JourneyResolver<'a, S> {
    store: &'a S,
    directory: StationDirectory<'a, S>,
}

impl<'a, S: RailStore> JourneyResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            directory: StationDirectory::new(store),
        }
    }

    /// Find the journey of a train starting on `date`.
    async fn find_journey(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
        date: NaiveDate,
    ) -> Result<Journey, ServiceError> {
        let (from, to) = day_bounds(date);
        self.store
            .journeys_starting_between(train_type, train_number, from, to)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::JourneyNotFound {
                train_type: train_type.clone(),
                train_number,
                date,
            })
    }

    /// Resolve one stop into its API shape.
    ///
    /// Fails with a not-found error if the station or the planned detail is
    /// missing. A dangling actual detail reference is treated as no actual
    /// detail.
    async fn resolve_stop(&self, stop: &Stop) -> Result<ApiStop, ServiceError> {
        let station = self.directory.by_eva(stop.station).await?;

        let planned = self
            .store
            .stop_detail(&stop.planned_detail_id)
            .await?
            .ok_or_else(|| ServiceError::StopDetailNotFound(stop.planned_detail_id.clone()))?;

        let actual = match &stop.actual_detail_id {
            Some(id) => self.store.stop_detail(id).await?,
            None => None,
        };

        Ok(ApiStop::resolve(
            station,
            stop.ordinal,
            &planned,
            actual.as_ref(),
        ))
    }

    /// Resolve stops in order, skipping unresolvable ones.
    ///
    /// Returns the resolved stops and how many were skipped. Storage
    /// failures still abort.
    async fn resolve_stops(&self, stops: &[Stop]) -> Result<(Vec<ApiStop>, usize), ServiceError> {
        let mut resolved = Vec::with_capacity(stops.len());
        let mut skipped = 0;

        let mut results = pin!(stream::iter(stops).then(|stop| async move {
            (stop, self.resolve_stop(stop).await)
        }));

        while let Some((stop, result)) = results.next().await {
            match result {
                Ok(api_stop) => resolved.push(api_stop),
                Err(e) if e.is_not_found() => {
                    warn!(stop = %stop.id, ordinal = stop.ordinal, error = %e, "skipping unresolvable stop");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((resolved, skipped))
    }

    /// The itinerary of a train on the calendar day of `date`.
    ///
    /// Fails with `JourneyNotFound` if the train does not run that day.
    /// Returns `None` if none of its stops could be resolved.
    pub async fn journey(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
        date: NaiveDate,
    ) -> Result<Option<Itinerary>, ServiceError> {
        let journey = self.find_journey(train_type, train_number, date).await?;
        let stops = self.store.stops_of_journey(&journey.key).await?;
        let (resolved, skipped) = self.resolve_stops(&stops).await?;

        if skipped > 0 {
            debug!(
                %train_type,
                train_number,
                %date,
                skipped,
                resolved = resolved.len(),
                "itinerary is partial"
            );
        }

        Ok(Itinerary::assemble(&journey, resolved, skipped))
    }

    /// The itinerary of a train, with `date` interpreted as the day it
    /// reaches `reference`.
    ///
    /// If the train reaches the reference station on a different calendar
    /// day than it started, the journey is resolved again using that day.
    /// Otherwise the already resolved itinerary is returned.
    pub async fn journey_at_reference(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
        date: NaiveDate,
        reference: &Ds100,
    ) -> Result<Option<Itinerary>, ServiceError> {
        let Some(itinerary) = self.journey(train_type, train_number, date).await? else {
            return Ok(None);
        };

        let station = self.directory.by_ds100(reference).await?;

        let stop = itinerary
            .stops
            .iter()
            .find(|s| s.station.ds100 == station.ds100)
            .ok_or_else(|| ServiceError::ReferenceStationNotInJourney(station.ds100.clone()))?;

        let event = stop
            .reference_time()
            .ok_or_else(|| ServiceError::ReferenceStopWithoutTime(station.ds100.clone()))?;

        let event_day = event.date();
        if event_day != itinerary.start.date() {
            debug!(
                reference = %station.ds100,
                start = %itinerary.start.date(),
                %event_day,
                "reference stop is on a later day, re-resolving"
            );
            return self.journey(train_type, train_number, event_day).await;
        }

        Ok(Some(itinerary))
    }

    /// Every occurrence of a train, most recent first, with its first and
    /// last station and number of stops.
    pub async fn journey_dates(
        &self,
        train_type: &TrainType,
        train_number: TrainNumber,
    ) -> Result<JourneyDates, ServiceError> {
        let journeys = self.store.journeys_of_train(train_type, train_number).await?;

        let mut dates = Vec::with_capacity(journeys.len());
        for journey in journeys {
            let stops = self.store.stops_of_journey(&journey.key).await?;
            let (first, last) = extremes(&stops);

            let origin = match first {
                Some(eva) => self.station_or_none(eva).await?,
                None => None,
            };
            let destination = match last {
                Some(eva) => self.station_or_none(eva).await?,
                None => None,
            };

            dates.push(JourneyDate {
                start: journey.key.start,
                line: journey.line,
                origin,
                destination,
                stop_count: stops.len(),
            });
        }

        Ok(JourneyDates {
            train_type: train_type.clone(),
            train_number,
            count: dates.len(),
            dates,
        })
    }

    /// Journeys calling at a station on the calendar day of `date`.
    ///
    /// Origins and destinations are looked up in the station snapshot, so
    /// this fails with `SnapshotUnavailable` before the snapshot is loaded.
    pub async fn journeys_at_station(
        &self,
        ds100: &Ds100,
        date: NaiveDate,
        stations: Option<&StationIndex>,
    ) -> Result<StationJourneys, ServiceError> {
        let station = self.directory.by_ds100(ds100).await?;
        let stations = stations.ok_or(ServiceError::SnapshotUnavailable)?;

        let (from, to) = day_bounds(date);
        let stops = self
            .store
            .stops_at_station_between(station.eva, from, to)
            .await?;

        let mut journeys = Vec::with_capacity(stops.len());
        for stop in &stops {
            let Some(journey) = self.store.journey(&stop.journey).await? else {
                warn!(stop = %stop.id, journey = %stop.journey.id, "stop references unknown journey");
                continue;
            };

            let journey_stops = self.store.stops_of_journey(&journey.key).await?;
            let (first, last) = extremes(&journey_stops);

            journeys.push(JourneySummary {
                train_type: journey.train_type,
                train_number: journey.train_number,
                line: journey.line,
                start: journey.key.start,
                origin: first.and_then(|eva| stations.get(eva)).cloned(),
                destination: last.and_then(|eva| stations.get(eva)).cloned(),
                stop_count: journey_stops.len(),
            });
        }

        Ok(StationJourneys {
            station,
            count: journeys.len(),
            journeys,
        })
    }

    async fn station_or_none(&self, eva: Eva) -> Result<Option<Station>, ServiceError> {
        match self.directory.by_eva(eva).await {
            Ok(station) => Ok(Some(station)),
            Err(ServiceError::StationNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Stations of the lowest and highest ordinal stop.
fn extremes(stops: &[Stop]) -> (Option<Eva>, Option<Eva>) {
    let first = stops.iter().min_by_key(|s| s.ordinal).map(|s| s.station);
    let last = stops.iter().max_by_key(|s| s.ordinal).map(|s| s.station);
    (first, last)
}
