//! Rail network service.
//!
//! Serves station, journey and stop data from a MariaDB/MySQL store and
//! derives a station connectivity graph: which stations are adjacent,
//! how long trains take between them and how actual times deviate from
//! the plan.

pub mod cache;
pub mod config;
pub mod domain;
pub mod services;
pub mod snapshot;
pub mod store;
pub mod web;

#[cfg(test)]
mod test_support;
