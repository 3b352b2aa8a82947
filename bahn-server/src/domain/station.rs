//! Station identifiers and the public station shape.

use std::fmt;

use serde::Serialize;

/// Error returned when parsing an invalid EVA number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid EVA number: {reason}")]
pub struct InvalidEva {
    reason: &'static str,
}

/// A numeric EVA station identifier.
///
/// EVA numbers are the identifiers used by the reservation system. They are
/// always positive.
///
/// # Examples
///
/// ```
/// use bahn_server::domain::Eva;
///
/// let frankfurt = Eva::parse("8000105").unwrap();
/// assert_eq!(frankfurt.get(), 8000105);
///
/// assert!(Eva::parse("0").is_err());
/// assert!(Eva::parse("FF").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Eva(u32);

impl Eva {
    /// Create an EVA number from its numeric value.
    pub fn new(value: u32) -> Result<Self, InvalidEva> {
        if value == 0 {
            return Err(InvalidEva {
                reason: "must be positive",
            });
        }
        Ok(Self(value))
    }

    /// Parse an EVA number from a decimal string.
    pub fn parse(s: &str) -> Result<Self, InvalidEva> {
        let value = s.trim().parse::<u32>().map_err(|_| InvalidEva {
            reason: "must be a decimal number",
        })?;
        Self::new(value)
    }

    /// Returns the numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Eva {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an invalid DS100 code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid DS100 code: {reason}")]
pub struct InvalidDs100 {
    reason: &'static str,
}

/// Longest DS100 code accepted.
const MAX_DS100_LEN: usize = 8;

/// A DS100 operational station code (e.g. `FF`, `MH N`).
///
/// Codes are normalized to uppercase with surrounding whitespace removed.
/// Inner spaces are significant and kept.
///
/// # Examples
///
/// ```
/// use bahn_server::domain::Ds100;
///
/// let code = Ds100::parse(" ff ").unwrap();
/// assert_eq!(code.as_str(), "FF");
///
/// assert!(Ds100::parse("").is_err());
/// assert!(Ds100::parse("F-F").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ds100(String);

impl Ds100 {
    /// Parse and normalize a DS100 code.
    pub fn parse(s: &str) -> Result<Self, InvalidDs100> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidDs100 {
                reason: "must not be empty",
            });
        }

        if trimmed.len() > MAX_DS100_LEN {
            return Err(InvalidDs100 {
                reason: "too long",
            });
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ')
        {
            return Err(InvalidDs100 {
                reason: "must be ASCII letters, digits or spaces",
            });
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Accept a code read back from storage without format checks.
    ///
    /// Stored codes are normalized the same way as [`Ds100::parse`] but may
    /// be empty or contain punctuation.
    pub fn from_stored(s: &str) -> Self {
        Self(s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ds100 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coordinate pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location only if both coordinates are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// A station as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub eva: Eva,
    pub name: String,
    pub ds100: Ds100,
    pub location: Option<Location>,
}
