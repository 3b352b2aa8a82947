//! Core services over a [`RailStore`](crate::store::RailStore).

mod adjacency;
mod directory;
mod error;
mod journeys;
mod network;
mod statistics;

pub use adjacency::{
    AdjacencyExtractor, InvalidWindow, NeighborAccumulator, ObservationWindow, TravelSample,
};
pub use directory::{StationDirectory, StationIndex};
pub use error::ServiceError;
pub use journeys::{JourneyDate, JourneyDates, JourneyResolver, JourneySummary, StationJourneys};
pub use network::{ConnectionAggregator, EdgeSet};
pub use statistics::{Statistics, statistics};
