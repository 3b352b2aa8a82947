//! Process-wide station and connection snapshots.
//!
//! Both snapshots are produced by a background task and may be absent;
//! readers must handle the cold-start case. Build progress is published
//! through a watch channel so the aggregator can report it without
//! awaiting a lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{ConnectionGraph, Station};
use crate::services::{
    ConnectionAggregator, ObservationWindow, ServiceError, StationDirectory, StationIndex,
};
use crate::store::RailStore;

/// Progress of the background build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    NotStarted,
    LoadingStations,
    Processing { current: usize, total: usize },
    Ready,
    Disabled,
    Failed(String),
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::NotStarted => f.write_str("Not started"),
            BuildStatus::LoadingStations => f.write_str("Loading stations"),
            BuildStatus::Processing { current, total } => {
                write!(f, "Processing station {current}/{total}")
            }
            BuildStatus::Ready => f.write_str("Ready"),
            BuildStatus::Disabled => f.write_str("Connection build disabled"),
            BuildStatus::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// The station list as loaded at one point in time.
#[derive(Debug)]
pub struct StationSnapshot {
    pub taken_at: NaiveDateTime,
    pub stations: Vec<Station>,
    pub index: StationIndex,
}

impl StationSnapshot {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            taken_at: Local::now().naive_local(),
            index: StationIndex::new(&stations),
            stations,
        }
    }
}

struct Inner {
    stations: RwLock<Option<Arc<StationSnapshot>>>,
    connections: RwLock<Option<Arc<ConnectionGraph>>>,
    status: watch::Sender<BuildStatus>,
}

/// Shared handle to the snapshots. Cheap to clone.
#[derive(Clone)]
pub struct NetworkSnapshot {
    inner: Arc<Inner>,
}

impl Default for NetworkSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSnapshot {
    /// Empty snapshot with status `NotStarted`.
    pub fn new() -> Self {
        let (status, _) = watch::channel(BuildStatus::NotStarted);
        Self {
            inner: Arc::new(Inner {
                stations: RwLock::new(None),
                connections: RwLock::new(None),
                status,
            }),
        }
    }

    pub fn status(&self) -> BuildStatus {
        self.inner.status.borrow().clone()
    }

    pub fn set_status(&self, status: BuildStatus) {
        self.inner.status.send_replace(status);
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<BuildStatus> {
        self.inner.status.subscribe()
    }

    /// The station snapshot, if loaded.
    pub async fn stations(&self) -> Option<Arc<StationSnapshot>> {
        self.inner.stations.read().await.clone()
    }

    /// The connection graph, or `NotReady` carrying the build status.
    pub async fn connections(&self) -> Result<Arc<ConnectionGraph>, ServiceError> {
        match self.inner.connections.read().await.as_ref() {
            Some(graph) => Ok(Arc::clone(graph)),
            None => Err(ServiceError::NotReady(self.status().to_string())),
        }
    }

    pub async fn replace_stations(&self, stations: Vec<Station>) -> Arc<StationSnapshot> {
        let snapshot = Arc::new(StationSnapshot::new(stations));
        *self.inner.stations.write().await = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub async fn replace_connections(&self, graph: ConnectionGraph) {
        *self.inner.connections.write().await = Some(Arc::new(graph));
    }
}

/// What the background task builds and how often.
#[derive(Debug, Clone, Copy)]
pub struct BuildSettings {
    pub window: ObservationWindow,
    pub build_connections: bool,
    pub rebuild_every: Option<Duration>,
}

/// Load stations and, if enabled, aggregate the connection graph.
///
/// Each snapshot is replaced only once it is complete, so a failed run
/// leaves the previous graph in place.
pub async fn build_snapshot<S: RailStore>(
    store: &S,
    snapshot: &NetworkSnapshot,
    settings: &BuildSettings,
) -> Result<(), ServiceError> {
    snapshot.set_status(BuildStatus::LoadingStations);
    let stations = StationDirectory::new(store).all().await?;
    let stations = snapshot.replace_stations(stations).await;
    info!(count = stations.stations.len(), "station snapshot loaded");

    if !settings.build_connections {
        snapshot.set_status(BuildStatus::Disabled);
        return Ok(());
    }

    let graph = ConnectionAggregator::new(store, settings.window)
        .build(&stations.stations, |current, total| {
            snapshot.set_status(BuildStatus::Processing { current, total })
        })
        .await?;

    snapshot.replace_connections(graph).await;
    snapshot.set_status(BuildStatus::Ready);
    Ok(())
}

async fn run_build<S: RailStore>(store: &S, snapshot: &NetworkSnapshot, settings: &BuildSettings) {
    if let Err(e) = build_snapshot(store, snapshot, settings).await {
        error!(error = %e, "snapshot build failed");
        snapshot.set_status(BuildStatus::Failed(e.to_string()));
    }
}

/// Spawn the startup build and, if configured, periodic rebuilds.
pub fn spawn_builder<S>(
    store: Arc<S>,
    snapshot: NetworkSnapshot,
    settings: BuildSettings,
) -> JoinHandle<()>
where
    S: RailStore + 'static,
{
    tokio::spawn(async move {
        run_build(store.as_ref(), &snapshot, &settings).await;

        let Some(period) = settings.rebuild_every else {
            return;
        };

        let mut interval = tokio::time::interval(period);
        interval.tick().await; // first tick is immediate
        loop {
            interval.tick().await;
            info!("rebuilding snapshot");
            run_build(store.as_ref(), &snapshot, &settings).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ds100;
    use crate::test_support::*;

    fn settings(build_connections: bool) -> BuildSettings {
        BuildSettings {
            window: ObservationWindow::new(dt(1, 0, 0), dt(31, 23, 59)).unwrap(),
            build_connections,
            rebuild_every: None,
        }
    }

    #[tokio::test]
    async fn in_flight_build_is_not_ready() {
        let snapshot = NetworkSnapshot::new();
        snapshot.set_status(BuildStatus::Processing {
            current: 3,
            total: 10,
        });

        let err = snapshot.connections().await.unwrap_err();
        let ServiceError::NotReady(status) = err else {
            panic!("expected NotReady, got {err:?}");
        };
        assert!(status.contains('3'));
        assert!(status.contains("10"));
        assert_eq!(status, "Processing station 3/10");
    }

    #[tokio::test]
    async fn cold_snapshot_is_absent() {
        let snapshot = NetworkSnapshot::new();
        assert!(snapshot.stations().await.is_none());
        assert_eq!(snapshot.status(), BuildStatus::NotStarted);
    }

    #[tokio::test]
    async fn build_populates_both_snapshots() {
        let store = frankfurt_network();
        let snapshot = NetworkSnapshot::new();

        build_snapshot(&store, &snapshot, &settings(true))
            .await
            .unwrap();

        assert_eq!(snapshot.status(), BuildStatus::Ready);
        assert_eq!(snapshot.stations().await.unwrap().stations.len(), 4);
        assert_eq!(snapshot.connections().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn unusual_stored_codes_do_not_stop_the_build() {
        let mut store = frankfurt_network();
        let mut odd = record(8098160, "XX", "Berlin Hbf (tief)", None, None);
        odd.ds100 = Ds100::from_stored("");
        store.add_station(odd);
        let snapshot = NetworkSnapshot::new();

        build_snapshot(&store, &snapshot, &settings(true))
            .await
            .unwrap();

        assert_eq!(snapshot.status(), BuildStatus::Ready);
        assert_eq!(snapshot.stations().await.unwrap().stations.len(), 5);
        assert_eq!(snapshot.connections().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn disabled_build_loads_stations_only() {
        let store = frankfurt_network();
        let snapshot = NetworkSnapshot::new();

        build_snapshot(&store, &snapshot, &settings(false))
            .await
            .unwrap();

        assert!(snapshot.stations().await.is_some());
        let err = snapshot.connections().await.unwrap_err();
        assert_eq!(err.to_string(), "not ready: Connection build disabled");
    }

    #[tokio::test]
    async fn failed_status_keeps_previous_graph() {
        let snapshot = NetworkSnapshot::new();
        snapshot
            .replace_connections(ConnectionGraph::default())
            .await;
        snapshot.set_status(BuildStatus::Failed("database error".into()));

        assert!(snapshot.connections().await.is_ok());
        assert_eq!(snapshot.status().to_string(), "Failed: database error");
    }

    #[tokio::test]
    async fn spawned_builder_reaches_ready() {
        let store = Arc::new(frankfurt_network());
        let snapshot = NetworkSnapshot::new();

        spawn_builder(store, snapshot.clone(), settings(true))
            .await
            .unwrap();

        assert_eq!(snapshot.status(), BuildStatus::Ready);
        assert!(snapshot.connections().await.is_ok());
    }
}
