//! Domain types for the rail network service.
//!
//! Value types validate their input at construction time, so code that
//! receives an `Eva`, `Ds100` or `TrainType` can trust it.

mod connection;
pub mod distance;
mod itinerary;
mod journey;
mod station;
mod stop;
pub mod time;

pub use connection::{Connection, ConnectionGraph, NeighborConnection, StationConnections};
pub use itinerary::{ApiStop, Destination, Itinerary, Origin, delay_minutes};
pub use journey::{
    InvalidTrainNumber, InvalidTrainType, Journey, JourneyKey, TrainNumber, TrainType,
    parse_train_number,
};
pub use station::{Ds100, Eva, InvalidDs100, InvalidEva, Location, Station};
pub use stop::{ObservedStop, Stop, StopDetail, StopStatus, StopTimes, UnknownStopStatus};
