//! Fixture builders shared by unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Ds100, Eva, Journey, JourneyKey, StopDetail, TrainType};
use crate::store::{MemoryStore, StationRecord};

pub const FF: u32 = 8000105;
pub const RM: u32 = 8000244;
pub const KA: u32 = 8000191;
pub const MH: u32 = 8000261;

/// A day in March 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// A time on a day in March 2024.
pub fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).unwrap()
}

pub fn record(
    eva: u32,
    ds100: &str,
    name: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> StationRecord {
    StationRecord {
        id: i64::from(eva),
        eva: Eva::new(eva).unwrap(),
        name: name.to_string(),
        ds100: Ds100::parse(ds100).unwrap(),
        latitude,
        longitude,
    }
}

/// One stop of a fixture journey.
pub struct Call {
    pub eva: u32,
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
    pub actual: Option<(Option<NaiveDateTime>, Option<NaiveDateTime>)>,
}

pub fn call(eva: u32, arrival: Option<NaiveDateTime>, departure: Option<NaiveDateTime>) -> Call {
    Call {
        eva,
        arrival,
        departure,
        actual: None,
    }
}

impl Call {
    /// Attach an actual detail with the given times.
    pub fn actual(mut self, arrival: Option<NaiveDateTime>, departure: Option<NaiveDateTime>) -> Self {
        self.actual = Some((arrival, departure));
        self
    }
}

/// Add a journey and its calls (ordinals in list order).
pub fn add_journey(
    store: &mut MemoryStore,
    id: &str,
    train: (&str, u32),
    start: NaiveDateTime,
    calls: Vec<Call>,
) -> JourneyKey {
    let key = JourneyKey {
        id: id.to_string(),
        start,
    };

    store.add_journey(Journey {
        key: key.clone(),
        train_type: TrainType::parse(train.0).unwrap(),
        train_number: train.1,
        line: None,
    });

    for (ordinal, c) in calls.into_iter().enumerate() {
        let planned = StopDetail {
            arrival: c.arrival,
            departure: c.departure,
            ..Default::default()
        };
        let actual = c.actual.map(|(arrival, departure)| StopDetail {
            arrival,
            departure,
            ..Default::default()
        });
        store.add_call(
            &key,
            ordinal as u32,
            Eva::new(c.eva).unwrap(),
            planned,
            actual,
        );
    }

    key
}

/// Frankfurt, Mannheim, Karlsruhe and a München record without coordinates.
///
/// - ICE 599 on the 15th (with actuals) and 16th (plan only): FF → RM → KA
/// - RE 1 on the 15th: KA → RM → FF
pub fn frankfurt_network() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_station(record(FF, "FF", "Frankfurt(Main)Hbf", Some(50.107145), Some(8.663789)));
    store.add_station(record(RM, "RM", "Mannheim Hbf", Some(49.479352), Some(8.469716)));
    store.add_station(record(KA, "KA", "Karlsruhe Hbf", Some(48.993512), Some(8.401848)));
    store.add_station(record(MH, "MH", "München Hbf", None, None));

    add_journey(
        &mut store,
        "ice599",
        ("ICE", 599),
        dt(15, 0, 0),
        vec![
            call(FF, None, Some(dt(15, 8, 0))).actual(None, Some(dt(15, 8, 2))),
            call(RM, Some(dt(15, 8, 38)), Some(dt(15, 8, 40)))
                .actual(Some(dt(15, 8, 45)), Some(dt(15, 8, 47))),
            call(KA, Some(dt(15, 9, 5)), None).actual(Some(dt(15, 9, 12)), None),
        ],
    );

    add_journey(
        &mut store,
        "ice599",
        ("ICE", 599),
        dt(16, 0, 0),
        vec![
            call(FF, None, Some(dt(16, 8, 0))),
            call(RM, Some(dt(16, 8, 38)), Some(dt(16, 8, 40))),
            call(KA, Some(dt(16, 9, 5)), None),
        ],
    );

    add_journey(
        &mut store,
        "re1",
        ("RE", 1),
        dt(15, 0, 0),
        vec![
            call(KA, None, Some(dt(15, 10, 0))),
            call(RM, Some(dt(15, 10, 50)), Some(dt(15, 10, 52))),
            call(FF, Some(dt(15, 11, 40)), None),
        ],
    );

    store
}
