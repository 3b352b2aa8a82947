//! Data transfer objects for web requests and responses.
//!
//! Query parameters arrive as optional strings. Each request type has a
//! `validate` method that checks presence first, then format, and returns
//! the error message sent back with a 400.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Ds100, Eva, InvalidTrainNumber, Station, TrainNumber, TrainType, parse_train_number,
};

/// Treat empty and whitespace-only values as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn bad_request(what: &str) -> String {
    format!("Bad Request -- {what}")
}

/// Parse a calendar date, accepting a trailing time of day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .ok()
                .map(|dt| dt.date())
        })
}

/// `/station` query: exactly one identifier is used, tried in this order.
#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    pub name: Option<String>,
    pub ds100: Option<String>,
    pub eva: Option<String>,
}

/// A validated station lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationLookup {
    Name(String),
    Ds100(Ds100),
    Eva(Eva),
}

impl StationQuery {
    pub fn validate(&self) -> Result<StationLookup, String> {
        if let Some(name) = present(&self.name) {
            return Ok(StationLookup::Name(name.to_string()));
        }
        if let Some(ds100) = present(&self.ds100) {
            return Ds100::parse(ds100)
                .map(StationLookup::Ds100)
                .map_err(|_| bad_request("DS100 is invalid"));
        }
        if let Some(eva) = present(&self.eva) {
            return Eva::parse(eva)
                .map(StationLookup::Eva)
                .map_err(|_| bad_request("EVA is invalid"));
        }
        Err(bad_request("Unique identifier is missing"))
    }
}

/// `/journey/dates` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainQuery {
    pub train_type: Option<String>,
    pub train_number: Option<String>,
}

/// A validated train identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRequest {
    pub train_type: TrainType,
    pub train_number: TrainNumber,
}

/// Check formats of a train identity whose fields are both present.
fn parse_train(train_type: &str, train_number: &str) -> Result<TrainRequest, String> {
    let train_number = parse_train_number(train_number).map_err(|e| match e {
        InvalidTrainNumber::NotANumber => bad_request("TrainNumber is not a number"),
        InvalidTrainNumber::Negative => bad_request("TrainNumber is negative"),
    })?;
    let train_type =
        TrainType::parse(train_type).map_err(|_| bad_request("TrainType is invalid"))?;

    Ok(TrainRequest {
        train_type,
        train_number,
    })
}

impl TrainQuery {
    pub fn validate(&self) -> Result<TrainRequest, String> {
        let train_type =
            present(&self.train_type).ok_or_else(|| bad_request("TrainType is missing"))?;
        let train_number =
            present(&self.train_number).ok_or_else(|| bad_request("TrainNumber is missing"))?;

        parse_train(train_type, train_number)
    }
}

/// `/journey` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyQuery {
    pub train_type: Option<String>,
    pub train_number: Option<String>,
    pub date: Option<String>,
    /// Optional reference station (DS100)
    pub station: Option<String>,
}

/// A validated journey request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRequest {
    pub train: TrainRequest,
    pub date: NaiveDate,
    pub station: Option<Ds100>,
}

impl JourneyQuery {
    pub fn validate(&self) -> Result<JourneyRequest, String> {
        let train_type =
            present(&self.train_type).ok_or_else(|| bad_request("TrainType is missing"))?;
        let train_number =
            present(&self.train_number).ok_or_else(|| bad_request("TrainNumber is missing"))?;
        let date = present(&self.date).ok_or_else(|| bad_request("Date is missing"))?;

        let train = parse_train(train_type, train_number)?;
        let date = parse_date(date).ok_or_else(|| bad_request("Date is invalid"))?;

        let station = present(&self.station)
            .map(Ds100::parse)
            .transpose()
            .map_err(|_| bad_request("Station is invalid"))?;

        Ok(JourneyRequest {
            train,
            date,
            station,
        })
    }
}

/// `/station/journeys` query.
#[derive(Debug, Default, Deserialize)]
pub struct StationDayQuery {
    pub ds100: Option<String>,
    pub date: Option<String>,
}

impl StationDayQuery {
    pub fn validate(&self) -> Result<(Ds100, NaiveDate), String> {
        let date = present(&self.date).ok_or_else(|| bad_request("Date is missing"))?;
        let ds100 = present(&self.ds100).ok_or_else(|| bad_request("DS100 is missing"))?;

        let date = parse_date(date).ok_or_else(|| bad_request("Date is invalid"))?;
        let ds100 = Ds100::parse(ds100).map_err(|_| bad_request("DS100 is invalid"))?;
        Ok((ds100, date))
    }
}

/// `/station/connections` query.
#[derive(Debug, Default, Deserialize)]
pub struct Ds100Query {
    pub ds100: Option<String>,
}

impl Ds100Query {
    pub fn validate(&self) -> Result<Ds100, String> {
        let ds100 = present(&self.ds100).ok_or_else(|| bad_request("DS100 is missing"))?;
        Ds100::parse(ds100).map_err(|_| bad_request("DS100 is invalid"))
    }
}

/// All stations, with the time the list was produced.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub ts: NaiveDateTime,
    pub count: usize,
    pub stations: Vec<Station>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn station_lookup_order() {
        let query = StationQuery {
            name: s("Mann"),
            ds100: s("FF"),
            eva: None,
        };
        assert_eq!(
            query.validate(),
            Ok(StationLookup::Name("Mann".to_string()))
        );

        let query = StationQuery {
            name: s("  "),
            ds100: s("ff"),
            eva: s("8000105"),
        };
        assert_eq!(
            query.validate(),
            Ok(StationLookup::Ds100(Ds100::parse("FF").unwrap()))
        );

        let query = StationQuery {
            eva: s("8000105"),
            ..Default::default()
        };
        assert_eq!(
            query.validate(),
            Ok(StationLookup::Eva(Eva::new(8000105).unwrap()))
        );
    }

    #[test]
    fn station_lookup_needs_an_identifier() {
        assert_eq!(
            StationQuery::default().validate(),
            Err("Bad Request -- Unique identifier is missing".to_string())
        );
        let query = StationQuery {
            eva: s("FF"),
            ..Default::default()
        };
        assert_eq!(
            query.validate(),
            Err("Bad Request -- EVA is invalid".to_string())
        );
    }

    #[test]
    fn train_query_messages() {
        let missing_type = TrainQuery {
            train_number: s("599"),
            ..Default::default()
        };
        assert_eq!(
            missing_type.validate().unwrap_err(),
            "Bad Request -- TrainType is missing"
        );

        let missing_number = TrainQuery {
            train_type: s("ICE"),
            ..Default::default()
        };
        assert_eq!(
            missing_number.validate().unwrap_err(),
            "Bad Request -- TrainNumber is missing"
        );

        let not_number = TrainQuery {
            train_type: s("ICE"),
            train_number: s("abc"),
        };
        assert_eq!(
            not_number.validate().unwrap_err(),
            "Bad Request -- TrainNumber is not a number"
        );

        let negative = TrainQuery {
            train_type: s("ICE"),
            train_number: s("-4"),
        };
        assert_eq!(
            negative.validate().unwrap_err(),
            "Bad Request -- TrainNumber is negative"
        );

        let ok = TrainQuery {
            train_type: s("ice"),
            train_number: s("599"),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.train_type.as_str(), "ICE");
        assert_eq!(ok.train_number, 599);
    }

    #[test]
    fn journey_query_messages() {
        let query = JourneyQuery {
            train_type: s("ICE"),
            train_number: s("599"),
            ..Default::default()
        };
        assert_eq!(query.validate().unwrap_err(), "Bad Request -- Date is missing");

        // a missing date outranks a malformed train number
        let query = JourneyQuery {
            train_type: s("ICE"),
            train_number: s("abc"),
            ..Default::default()
        };
        assert_eq!(query.validate().unwrap_err(), "Bad Request -- Date is missing");

        let query = JourneyQuery {
            train_type: s("ICE"),
            train_number: s("abc"),
            date: s("15.03.2024"),
            station: None,
        };
        assert_eq!(
            query.validate().unwrap_err(),
            "Bad Request -- TrainNumber is not a number"
        );

        let query = JourneyQuery {
            train_type: s("ICE"),
            train_number: s("599"),
            date: s("15.03.2024"),
            station: None,
        };
        assert_eq!(query.validate().unwrap_err(), "Bad Request -- Date is invalid");

        let query = JourneyQuery {
            train_type: s("ICE"),
            train_number: s("599"),
            date: s("2024-03-15T10:00:00"),
            station: s("rm"),
        };
        let request = query.validate().unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(request.station, Some(Ds100::parse("RM").unwrap()));
    }

    #[test]
    fn station_day_query_messages() {
        let query = StationDayQuery {
            ds100: s("FF"),
            date: None,
        };
        assert_eq!(query.validate().unwrap_err(), "Bad Request -- Date is missing");

        let query = StationDayQuery {
            ds100: None,
            date: s("2024-03-15"),
        };
        assert_eq!(query.validate().unwrap_err(), "Bad Request -- DS100 is missing");
    }

    #[test]
    fn dates_accept_iso_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("2024-03-15T23:10:00"), expected);
        assert_eq!(parse_date("2024-03-15T23:10:00.000Z"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }
}
