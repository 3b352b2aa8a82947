//! Stops and their planned/actual details.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::journey::{JourneyKey, TrainNumber, TrainType};
use super::station::Eva;

/// Error returned for an unknown stop status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stop status: {0}")]
pub struct UnknownStopStatus(pub String);

/// Operational status of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopStatus {
    #[default]
    Planned,
    Cancelled,
    Additional,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Planned => "PLANNED",
            StopStatus::Cancelled => "CANCELLED",
            StopStatus::Additional => "ADDITIONAL",
        }
    }
}

impl FromStr for StopStatus {
    type Err = UnknownStopStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(StopStatus::Planned),
            "CANCELLED" => Ok(StopStatus::Cancelled),
            "ADDITIONAL" => Ok(StopStatus::Additional),
            _ => Err(UnknownStopStatus(s.to_string())),
        }
    }
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arrival/departure/platform information for a stop, either as planned
/// or as actually observed.
///
/// An origin stop has no arrival, a terminal stop has no departure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopDetail {
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
    pub platform: Option<String>,
    pub status: StopStatus,
}

/// A stop of a journey at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub journey: JourneyKey,
    /// Zero-based position within the journey.
    pub ordinal: u32,
    pub station: Eva,
    pub planned_detail_id: String,
    pub actual_detail_id: Option<String>,
}

/// Arrival and departure times of one side (planned or actual) of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StopTimes {
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
}

/// A stop joined with its journey's train identity and both planned and
/// actual times, as read in a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedStop {
    pub journey: JourneyKey,
    pub ordinal: u32,
    pub station: Eva,
    pub train_type: TrainType,
    pub train_number: TrainNumber,
    pub planned: StopTimes,
    pub actual: StopTimes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status() {
        assert_eq!("PLANNED".parse::<StopStatus>().unwrap(), StopStatus::Planned);
        assert_eq!(
            "cancelled".parse::<StopStatus>().unwrap(),
            StopStatus::Cancelled
        );
        assert_eq!(
            "ADDITIONAL".parse::<StopStatus>().unwrap(),
            StopStatus::Additional
        );
        assert!("DELAYED".parse::<StopStatus>().is_err());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&StopStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        assert_eq!(StopStatus::default(), StopStatus::Planned);
    }
}
