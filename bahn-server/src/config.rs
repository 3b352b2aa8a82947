//! Environment-driven configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::cache::CacheConfig;
use crate::services::ObservationWindow;
use crate::snapshot::BuildSettings;
use crate::store::MySqlStoreConfig;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: MySqlStoreConfig,
    pub bind: SocketAddr,
    pub build: BuildSettings,
    pub cache: CacheConfig,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns `None` for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parsed(&lookup, "DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let host: IpAddr =
            parsed(&lookup, "BIND_ADDR")?.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port: u16 = parsed(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        let start = match lookup("OBSERVATION_WINDOW_START") {
            Some(v) => window_bound("OBSERVATION_WINDOW_START", &v, NaiveTime::MIN)?,
            None => default_window_start(),
        };
        let end = match lookup("OBSERVATION_WINDOW_END") {
            Some(v) => window_bound("OBSERVATION_WINDOW_END", &v, end_of_day())?,
            None => default_window_end(),
        };
        let window = ObservationWindow::new(start, end).map_err(|e| ConfigError::Invalid {
            var: "OBSERVATION_WINDOW_END",
            reason: e.to_string(),
        })?;

        let build_connections = match lookup("BUILD_CONNECTIONS") {
            Some(v) => flag("BUILD_CONNECTIONS", &v)?,
            None => true,
        };
        let rebuild_every = parsed::<u64, _>(&lookup, "CONNECTION_REBUILD_HOURS")?
            .filter(|hours| *hours > 0)
            .map(|hours| Duration::from_secs(hours * 60 * 60));

        let cache = CacheConfig {
            ttl: Duration::from_secs(
                parsed(&lookup, "RESPONSE_CACHE_TTL_SECS")?.unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            max_capacity: parsed(&lookup, "RESPONSE_CACHE_CAPACITY")?
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
        };

        Ok(Self {
            database: MySqlStoreConfig::new(url).with_max_connections(max_connections),
            bind: SocketAddr::new(host, port),
            build: BuildSettings {
                window,
                build_connections,
                rebuild_every,
            },
            cache,
        })
    }
}

fn parsed<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Parse a date or datetime. A bare date gets `time_of_day`.
fn window_bound(
    var: &'static str,
    value: &str,
    time_of_day: NaiveTime,
) -> Result<NaiveDateTime, ConfigError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(time_of_day));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        })
}

fn default_window_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}

fn default_window_end() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 31)
        .unwrap_or_default()
        .and_time(end_of_day())
}
