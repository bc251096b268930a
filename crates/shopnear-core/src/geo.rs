//! Validated geographic primitives.
//!
//! [`Position`] and [`Radius`] can only be built through checked
//! constructors, so any value of either type already satisfies its range
//! invariant. Raw upstream data enters as [`Coordinates`] and must pass
//! [`Coordinates::validate`] before it can be rendered or queried.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Returns `true` when both values are finite and inside the WGS84 ranges.
#[must_use]
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && latitude.abs() <= MAX_LATITUDE
        && longitude.abs() <= MAX_LONGITUDE
}

/// A latitude/longitude pair identifying a point on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Coordinates")]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

impl Position {
    /// Builds a position, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when either component fails
    /// validation.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if is_valid_coordinate(latitude, longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoreError::InvalidCoordinate {
                latitude: Some(latitude),
                longitude: Some(longitude),
            })
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// An unvalidated coordinate pair as it arrives from upstream data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Converts into a [`Position`] if both components are present and valid.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] otherwise.
    pub fn validate(self) -> Result<Position, CoreError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if is_valid_coordinate(latitude, longitude) => {
                Ok(Position {
                    latitude,
                    longitude,
                })
            }
            _ => Err(CoreError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            }),
        }
    }
}

impl From<Position> for Coordinates {
    fn from(position: Position) -> Self {
        Self::new(Some(position.latitude), Some(position.longitude))
    }
}

impl TryFrom<Coordinates> for Position {
    type Error = CoreError;

    fn try_from(value: Coordinates) -> Result<Self, Self::Error> {
        value.validate()
    }
}

/// Search radius, stored in meters.
///
/// The UI works in kilometers and the Nearby Search API in meters; the
/// conversion happens here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Radius(f64);

impl Radius {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRadius`] unless `meters` is finite and > 0.
    pub fn from_meters(meters: f64) -> Result<Self, CoreError> {
        if meters.is_finite() && meters > 0.0 {
            Ok(Self(meters))
        } else {
            Err(CoreError::InvalidRadius(meters))
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRadius`] unless `km` is finite and > 0.
    pub fn from_km(km: f64) -> Result<Self, CoreError> {
        Self::from_meters(km * 1000.0)
    }

    #[must_use]
    pub fn meters(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn km(self) -> f64 {
        self.0 / 1000.0
    }
}

impl TryFrom<f64> for Radius {
    type Error = CoreError;

    fn try_from(meters: f64) -> Result<Self, Self::Error> {
        Self::from_meters(meters)
    }
}

impl From<Radius> for f64 {
    fn from(radius: Radius) -> Self {
        radius.0
    }
}

/// A renderable point of interest. Only constructible from a validated
/// [`Position`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub position: Position,
    pub label: String,
}

impl MapMarker {
    #[must_use]
    pub fn new(position: Position, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }
}
