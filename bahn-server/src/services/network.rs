//! Network-wide connection graph.
//!
//! Adjacency is extracted per station, so every link is seen from both
//! ends. The aggregator merges both directions into one undirected edge.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::{Connection, ConnectionGraph, Eva, Station};
use crate::store::RailStore;

use super::adjacency::{AdjacencyExtractor, ObservationWindow};
use super::directory::StationIndex;
use super::error::ServiceError;

/// Undirected edge set keyed by station pair.
///
/// An edge inserted for (b, a) when (a, b) already exists is merged
/// into the existing one.
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: Vec<Connection>,
    index: HashMap<(Eva, Eva), usize>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Insert or merge an edge.
    ///
    /// Merged means are the plain average of the two means; used stops add up.
    pub fn insert(&mut self, edge: Connection) -> Result<(), ServiceError> {
        let a = edge.station1.eva;
        let b = edge.station2.eva;

        let existing = self
            .index
            .get(&(a, b))
            .or_else(|| self.index.get(&(b, a)))
            .copied();

        let Some(position) = existing else {
            self.index.insert((a, b), self.edges.len());
            self.edges.push(edge);
            return Ok(());
        };

        let current = self.edges.get_mut(position).ok_or_else(|| {
            ServiceError::InconsistentState(format!("edge index {position} out of range for {a}-{b}"))
        })?;

        if !current.same_pair(&edge) {
            return Err(ServiceError::InconsistentState(format!(
                "edge at {position} is {}-{}, expected {a}-{b}",
                current.station1.eva, current.station2.eva
            )));
        }

        current.average_planned_time =
            (current.average_planned_time + edge.average_planned_time) / 2.0;
        current.average_actual_time =
            (current.average_actual_time + edge.average_actual_time) / 2.0;
        current.used_stops += edge.used_stops;
        if current.distance.is_none() {
            current.distance = edge.distance;
        }

        Ok(())
    }

    pub fn into_graph(self) -> ConnectionGraph {
        ConnectionGraph::new(self.edges)
    }
}

/// Builds the connection graph over a station list.
pub struct ConnectionAggregator<'a, S> {
    extractor: AdjacencyExtractor<'a, S>,
}

impl<'a, S: RailStore> ConnectionAggregator<'a, S> {
    pub fn new(store: &'a S, window: ObservationWindow) -> Self {
        Self {
            extractor: AdjacencyExtractor::new(store, window),
        }
    }

    /// Aggregate adjacency of every station into one graph.
    ///
    /// `progress` is called with (1-based index, total) before each station.
    /// Any storage failure or inconsistency aborts the whole build.
    pub async fn build<F>(
        &self,
        stations: &[Station],
        mut progress: F,
    ) -> Result<ConnectionGraph, ServiceError>
    where
        F: FnMut(usize, usize),
    {
        let index = StationIndex::new(stations);
        let total = stations.len();
        let mut edges = EdgeSet::new();

        for (i, station) in stations.iter().enumerate() {
            progress(i + 1, total);

            let adjacency = self.extractor.connections_of(station, &index).await?;
            debug!(
                station = %station.ds100,
                neighbors = adjacency.connecting_stations.len(),
                "aggregating station"
            );

            for neighbor in adjacency.connecting_stations {
                edges.insert(Connection::from_neighbor(station, neighbor))?;
            }
        }

        info!(stations = total, edges = edges.len(), "connection graph built");
        Ok(edges.into_graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NeighborConnection;
    use crate::services::StationDirectory;
    use crate::test_support::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn station(eva: u32) -> Station {
        record(eva, &format!("X{}", eva % 1000), &format!("Station {eva}"), None, None).into()
    }

    fn edge(a: u32, b: u32, planned: f64, actual: f64, used: u32) -> Connection {
        Connection::from_neighbor(
            &station(a),
            NeighborConnection {
                station: station(b),
                average_planned_time: planned,
                average_actual_time: actual,
                used_stops: used,
                distance: None,
            },
        )
    }

    #[test]
    fn reverse_edge_is_merged() {
        let mut edges = EdgeSet::new();
        edges.insert(edge(1, 2, 10.0, 12.0, 3)).unwrap();
        edges.insert(edge(2, 1, 14.0, 16.0, 2)).unwrap();

        let graph = edges.into_graph();
        assert_eq!(graph.count, 1);
        let merged = &graph.connections[0];
        assert_eq!(merged.station1.eva, Eva::new(1).unwrap());
        assert_eq!(merged.average_planned_time, 12.0);
        assert_eq!(merged.average_actual_time, 14.0);
        assert_eq!(merged.used_stops, 5);
    }

    #[test]
    fn distinct_pairs_stay_separate() {
        let mut edges = EdgeSet::new();
        edges.insert(edge(1, 2, 10.0, 10.0, 1)).unwrap();
        edges.insert(edge(2, 3, 10.0, 10.0, 1)).unwrap();
        edges.insert(edge(1, 3, 10.0, 10.0, 1)).unwrap();
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn corrupted_index_is_inconsistent() {
        let mut edges = EdgeSet::new();
        edges.insert(edge(1, 2, 10.0, 10.0, 1)).unwrap();
        edges
            .index
            .insert((Eva::new(3).unwrap(), Eva::new(4).unwrap()), 0);

        let err = edges.insert(edge(4, 3, 1.0, 1.0, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::InconsistentState(_)));

        edges
            .index
            .insert((Eva::new(5).unwrap(), Eva::new(6).unwrap()), 7);
        let err = edges.insert(edge(5, 6, 1.0, 1.0, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::InconsistentState(_)));
    }

    #[tokio::test]
    async fn builds_network_graph() {
        let store = frankfurt_network();
        let stations = StationDirectory::new(&store).all().await.unwrap();
        let window = ObservationWindow::new(dt(1, 0, 0), dt(31, 23, 59)).unwrap();
        let aggregator = ConnectionAggregator::new(&store, window);

        let mut seen = Vec::new();
        let graph = aggregator
            .build(&stations, |i, n| seen.push((i, n)))
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert_eq!(graph.count, 2);
        assert_eq!(graph.connections.len(), 2);

        let ff_rm = graph
            .connections
            .iter()
            .find(|c| {
                let pair = [c.station1.ds100.as_str(), c.station2.ds100.as_str()];
                pair.contains(&"FF") && pair.contains(&"RM")
            })
            .unwrap();
        // 41 from both ends, 3 observations from each end
        assert_eq!(ff_rm.average_planned_time, 41.0);
        assert_eq!(ff_rm.average_actual_time, 43.0);
        assert_eq!(ff_rm.used_stops, 6);
        assert!(ff_rm.distance.is_some());
    }

    #[tokio::test]
    async fn empty_station_list_gives_empty_graph() {
        let store = frankfurt_network();
        let window = ObservationWindow::new(dt(1, 0, 0), dt(31, 23, 59)).unwrap();
        let graph = ConnectionAggregator::new(&store, window)
            .build(&[], |_, _| {})
            .await
            .unwrap();
        assert_eq!(graph.count, 0);
    }

    proptest! {
        #[test]
        fn no_duplicate_undirected_edges(
            pairs in prop::collection::vec((1u32..8, 1u32..8, 0u32..120, 1u32..5), 0..40)
        ) {
            let mut edges = EdgeSet::new();
            let mut expected_stops = 0;
            for (a, b, minutes, used) in pairs {
                expected_stops += used;
                edges.insert(edge(a, b, f64::from(minutes), f64::from(minutes), used)).unwrap();
            }

            let graph = edges.into_graph();
            let mut pairs_seen = HashSet::new();
            for c in &graph.connections {
                let (x, y) = (c.station1.eva.get(), c.station2.eva.get());
                prop_assert!(pairs_seen.insert((x.min(y), x.max(y))));
            }
            let total: u32 = graph.connections.iter().map(|c| c.used_stops).sum();
            prop_assert_eq!(total, expected_stops);
            prop_assert_eq!(graph.count, graph.connections.len());
        }
    }
}
