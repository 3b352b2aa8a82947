//! Web layer for the rail network service.
//!
//! Provides HTTP endpoints under `/bahn/v1` for stations, journeys and
//! the connection graph.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
