//! Aggregated adjacency between stations.

use serde::Serialize;

use super::station::Station;

/// A neighbor of one station, aggregated over all observed stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborConnection {
    pub station: Station,
    /// Mean planned travel time in minutes.
    pub average_planned_time: f64,
    /// Mean actual travel time in minutes.
    pub average_actual_time: f64,
    pub used_stops: u32,
    /// Great-circle distance in kilometres.
    pub distance: Option<f64>,
}

/// All neighbors of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConnections {
    pub station: Station,
    /// Number of stops at the station inside the observation window.
    pub used_stops: usize,
    pub connecting_stations: Vec<NeighborConnection>,
}

/// An undirected edge of the network graph.
///
/// `station1` and `station2` are in discovery order; the pair is
/// unordered for identity purposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub station1: Station,
    pub station2: Station,
    pub average_planned_time: f64,
    pub average_actual_time: f64,
    pub used_stops: u32,
    pub distance: Option<f64>,
}

impl Connection {
    /// Edge from `origin` to one of its neighbors.
    pub fn from_neighbor(origin: &Station, neighbor: NeighborConnection) -> Self {
        Self {
            station1: origin.clone(),
            station2: neighbor.station,
            average_planned_time: neighbor.average_planned_time,
            average_actual_time: neighbor.average_actual_time,
            used_stops: neighbor.used_stops,
            distance: neighbor.distance,
        }
    }

    /// Whether this edge joins the same two stations as `other`, in either
    /// order.
    pub fn same_pair(&self, other: &Connection) -> bool {
        let (a, b) = (self.station1.eva, self.station2.eva);
        let (c, d) = (other.station1.eva, other.station2.eva);
        (a == c && b == d) || (a == d && b == c)
    }
}

/// The full deduplicated network graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConnectionGraph {
    pub count: usize,
    pub connections: Vec<Connection>,
}

impl ConnectionGraph {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            count: connections.len(),
            connections,
        }
    }
}
