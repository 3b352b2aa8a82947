//! Journeys: one scheduled run of a train on a service date.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Error returned when parsing an invalid train type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train type: {reason}")]
pub struct InvalidTrainType {
    reason: &'static str,
}

/// Longest train type accepted (e.g. `ICE`, `RE`, `FLX`).
const MAX_TRAIN_TYPE_LEN: usize = 8;

/// Train category such as `ICE` or `RB`.
///
/// Stored uppercase so that lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrainType(String);

impl TrainType {
    /// Parse and normalize a train type.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainType> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidTrainType {
                reason: "must not be empty",
            });
        }

        if trimmed.len() > MAX_TRAIN_TYPE_LEN {
            return Err(InvalidTrainType {
                reason: "too long",
            });
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidTrainType {
                reason: "must be ASCII letters or digits",
            });
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the train type as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A train number, unique per train type and service date.
pub type TrainNumber = u32;

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTrainNumber {
    #[error("train number is not a number")]
    NotANumber,
    #[error("train number is negative")]
    Negative,
}

/// Parse a decimal train number.
pub fn parse_train_number(s: &str) -> Result<TrainNumber, InvalidTrainNumber> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| InvalidTrainNumber::NotANumber)?;
    if value < 0 {
        return Err(InvalidTrainNumber::Negative);
    }
    TrainNumber::try_from(value).map_err(|_| InvalidTrainNumber::NotANumber)
}

/// Composite identity of a journey occurrence.
///
/// Journey ids repeat across service dates, so the `start` is part of
/// the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JourneyKey {
    pub id: String,
    pub start: NaiveDateTime,
}

/// A scheduled journey.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub key: JourneyKey,
    pub train_type: TrainType,
    pub train_number: TrainNumber,
    pub line: Option<String>,
}

impl Journey {
    /// The service date this journey is anchored to.
    pub fn service_date(&self) -> NaiveDate {
        self.key.start.date()
    }
}
