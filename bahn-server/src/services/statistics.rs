//! Whole-dataset counters.

use serde::Serialize;

use crate::store::RailStore;

use super::error::ServiceError;

/// Row counts reported by the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub stop_count: u64,
    pub station_count: u64,
    pub journey_count: u64,
    /// Stop details marked as cancelled.
    pub cancelled_count: u64,
}

pub async fn statistics<S: RailStore>(store: &S) -> Result<Statistics, ServiceError> {
    let counts = store.counts().await?;
    Ok(Statistics {
        stop_count: counts.stops,
        station_count: counts.stations,
        journey_count: counts.journeys,
        cancelled_count: counts.cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Eva, StopDetail, StopStatus};
    use crate::test_support::*;

    #[tokio::test]
    async fn counts_fixture() {
        let mut store = frankfurt_network();
        let key = add_journey(&mut store, "rb7", ("RB", 7), dt(15, 0, 0), vec![]);
        store.add_call(
            &key,
            0,
            Eva::new(FF).unwrap(),
            StopDetail::default(),
            Some(StopDetail {
                status: StopStatus::Cancelled,
                ..Default::default()
            }),
        );

        let stats = statistics(&store).await.unwrap();
        assert_eq!(stats.station_count, 4);
        assert_eq!(stats.journey_count, 4);
        assert_eq!(stats.stop_count, 10);
        assert_eq!(stats.cancelled_count, 1);
    }

    #[test]
    fn serializes_camel_case() {
        let stats = Statistics {
            stop_count: 1,
            station_count: 2,
            journey_count: 3,
            cancelled_count: 0,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["stopCount"], 1);
        assert_eq!(json["cancelledCount"], 0);
    }
}
