//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::cache::cache_responses;
use crate::services::{
    AdjacencyExtractor, JourneyResolver, ServiceError, StationDirectory, StationIndex,
    statistics,
};
use crate::store::RailStore;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// API routes live under `/bahn/v1`; every GET is served through the
/// response cache.
pub fn create_router<S: RailStore + 'static>(state: AppState<S>) -> Router {
    let cache = state.cache.clone();

    let api = Router::new()
        .route("/stations", get(list_stations::<S>))
        .route("/station", get(find_station::<S>))
        .route("/statistics", get(get_statistics::<S>))
        .route("/journey/dates", get(journey_dates::<S>))
        .route("/journey", get(journey::<S>))
        .route("/station/journeys", get(station_journeys::<S>))
        .route("/station/connections", get(station_connections::<S>))
        .route("/connections", get(all_connections::<S>))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/bahn/v1", api)
        .layer(middleware::from_fn_with_state(cache, cache_responses))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// All stations, from the snapshot when loaded.
async fn list_stations<S: RailStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<StationListResponse>, AppError> {
    if let Some(snapshot) = state.snapshot.stations().await {
        return Ok(Json(StationListResponse {
            ts: snapshot.taken_at,
            count: snapshot.stations.len(),
            stations: snapshot.stations.clone(),
        }));
    }

    let stations = StationDirectory::new(state.store.as_ref()).all().await?;
    Ok(Json(StationListResponse {
        ts: Local::now().naive_local(),
        count: stations.len(),
        stations,
    }))
}

/// One station by DS100 or EVA, or every station matching a name prefix.
async fn find_station<S: RailStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<StationQuery>,
) -> Result<Response, AppError> {
    let lookup = query.validate().map_err(AppError::bad_request)?;
    let directory = StationDirectory::new(state.store.as_ref());

    let response = match lookup {
        StationLookup::Name(prefix) => Json(directory.by_name_prefix(&prefix).await?).into_response(),
        StationLookup::Ds100(ds100) => Json(directory.by_ds100(&ds100).await?).into_response(),
        StationLookup::Eva(eva) => Json(directory.by_eva(eva).await?).into_response(),
    };
    Ok(response)
}

async fn get_statistics<S: RailStore>(
    State(state): State<AppState<S>>,
) -> Result<Response, AppError> {
    Ok(Json(statistics(state.store.as_ref()).await?).into_response())
}

async fn journey_dates<S: RailStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<TrainQuery>,
) -> Result<Response, AppError> {
    let train = query.validate().map_err(AppError::bad_request)?;
    let dates = JourneyResolver::new(state.store.as_ref())
        .journey_dates(&train.train_type, train.train_number)
        .await?;
    Ok(Json(dates).into_response())
}

/// A train's itinerary, optionally anchored to a reference station.
async fn journey<S: RailStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<JourneyQuery>,
) -> Result<Response, AppError> {
    let request = query.validate().map_err(AppError::bad_request)?;
    let resolver = JourneyResolver::new(state.store.as_ref());
    let train = &request.train;

    let itinerary = match &request.station {
        None => {
            resolver
                .journey(&train.train_type, train.train_number, request.date)
                .await?
        }
        Some(reference) => {
            resolver
                .journey_at_reference(
                    &train.train_type,
                    train.train_number,
                    request.date,
                    reference,
                )
                .await?
        }
    };

    match itinerary {
        Some(itinerary) => Ok(Json(itinerary).into_response()),
        None => Err(AppError::journey_not_found()),
    }
}

async fn station_journeys<S: RailStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<StationDayQuery>,
) -> Result<Response, AppError> {
    let (ds100, date) = query.validate().map_err(AppError::bad_request)?;
    let snapshot = state.snapshot.stations().await;

    let journeys = JourneyResolver::new(state.store.as_ref())
        .journeys_at_station(&ds100, date, snapshot.as_ref().map(|s| &s.index))
        .await?;
    Ok(Json(journeys).into_response())
}

/// Neighbors of one station over the configured observation window.
async fn station_connections<S: RailStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<Ds100Query>,
) -> Result<Response, AppError> {
    let ds100 = query.validate().map_err(AppError::bad_request)?;
    let store = state.store.as_ref();
    let directory = StationDirectory::new(store);
    let station = directory.by_ds100(&ds100).await?;

    let extractor = AdjacencyExtractor::new(store, state.window);
    let connections = match state.snapshot.stations().await {
        Some(snapshot) => extractor.connections_of(&station, &snapshot.index).await?,
        None => {
            let index = StationIndex::new(&directory.all().await?);
            extractor.connections_of(&station, &index).await?
        }
    };
    Ok(Json(connections).into_response())
}

/// The network graph, or 404 with the build status while it is missing.
async fn all_connections<S: RailStore>(
    State(state): State<AppState<S>>,
) -> Result<Response, AppError> {
    let graph = state.snapshot.connections().await?;
    Ok(Json(graph.as_ref()).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl AppError {
    fn bad_request(message: String) -> Self {
        AppError::BadRequest { message }
    }

    fn journey_not_found() -> Self {
        AppError::NotFound {
            message: "Not Found -- Journey not found".to_string(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::JourneyNotFound { .. } => AppError::journey_not_found(),
            ServiceError::NotReady(status) => AppError::NotFound {
                message: format!("Not Found -- {status}"),
            },
            e if e.is_not_found() => AppError::NotFound {
                message: format!("Not Found -- {e}"),
            },
            e => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
