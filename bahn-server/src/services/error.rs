//! Service error types.

use chrono::NaiveDate;

use crate::domain::{Ds100, TrainNumber, TrainType};
use crate::store::StoreError;

/// Errors raised by the core services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No station matched an exact-key lookup
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// No journey of the train starts on the requested day
    #[error("journey not found: {train_type} {train_number} on {date}")]
    JourneyNotFound {
        train_type: TrainType,
        train_number: TrainNumber,
        date: NaiveDate,
    },

    /// A stop references a detail that does not exist
    #[error("stop detail not found: {0}")]
    StopDetailNotFound(String),

    /// The reference station is not served by the journey
    #[error("reference station {0} not in journey")]
    ReferenceStationNotInJourney(Ds100),

    /// The reference stop has neither an arrival nor a departure
    #[error("reference stop at {0} has no arrival or departure time")]
    ReferenceStopWithoutTime(Ds100),

    /// The station snapshot has not been loaded yet
    #[error("station snapshot unavailable")]
    SnapshotUnavailable,

    /// An aggregation invariant was violated
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    /// The background connection build has not finished
    #[error("not ready: {0}")]
    NotReady(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether this error means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::StationNotFound(_)
                | ServiceError::JourneyNotFound { .. }
                | ServiceError::StopDetailNotFound(_)
                | ServiceError::ReferenceStationNotInJourney(_)
                | ServiceError::ReferenceStopWithoutTime(_)
                | ServiceError::SnapshotUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServiceError::StationNotFound("DS100 XX".into());
        assert_eq!(err.to_string(), "station not found: DS100 XX");

        let err = ServiceError::JourneyNotFound {
            train_type: TrainType::parse("ICE").unwrap(),
            train_number: 599,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };
        assert_eq!(err.to_string(), "journey not found: ICE 599 on 2024-03-15");

        let err = ServiceError::ReferenceStationNotInJourney(Ds100::parse("FF").unwrap());
        assert_eq!(err.to_string(), "reference station FF not in journey");

        let err = ServiceError::NotReady("Processing station 3/10".into());
        assert_eq!(err.to_string(), "not ready: Processing station 3/10");
    }

    #[test]
    fn not_found_classification() {
        assert!(ServiceError::StationNotFound("x".into()).is_not_found());
        assert!(ServiceError::SnapshotUnavailable.is_not_found());
        assert!(!ServiceError::InconsistentState("x".into()).is_not_found());
        assert!(!ServiceError::NotReady("x".into()).is_not_found());
    }
}
