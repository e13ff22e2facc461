//! Coordinates, GeoJSON points and bounding boxes.
//!
//! The public API speaks "lat,lng" while stored points and box queries use
//! GeoJSON ordering `[lng, lat]`. Conversion between the two happens only in
//! this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::uploads::Upload;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("expected \"lat,lng\", got {0:?}")]
    Malformed(String),

    #[error("latitude {0} is outside -90..90")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..180")]
    Longitude(f64),
}

/// A latitude/longitude pair as clients send it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }
}

impl FromStr for Coordinates {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Malformed(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        Coordinates::new(lat, lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    Point,
}

/// GeoJSON point. `coordinates` is `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: PointType,
    pub coordinates: [f64; 2],
}

impl Point {
    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    /// Validated view of this point; rejects out-of-range client input.
    pub fn coordinates(&self) -> Result<Coordinates, GeoError> {
        Coordinates::new(self.lat(), self.lng())
    }
}

impl From<Coordinates> for Point {
    fn from(c: Coordinates) -> Self {
        Self {
            kind: PointType::Point,
            coordinates: [c.lng, c.lat],
        }
    }
}

/// Axis-aligned rectangle spanned by two opposite corners. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Corners may arrive swapped; the box is normalised so min <= max on both axes.
    pub fn from_corners(top_right: Coordinates, bottom_left: Coordinates) -> Self {
        Self {
            min_lng: bottom_left.lng.min(top_right.lng),
            min_lat: bottom_left.lat.min(top_right.lat),
            max_lng: bottom_left.lng.max(top_right.lng),
            max_lat: bottom_left.lat.max(top_right.lat),
        }
    }

    /// `[[bl.lng, bl.lat], [tr.lng, tr.lat]]`, the shape of a `$box` query.
    pub fn as_box(&self) -> [[f64; 2]; 2] {
        [[self.min_lng, self.min_lat], [self.max_lng, self.max_lat]]
    }

    pub fn contains(&self, point: &Point) -> bool {
        (self.min_lng..=self.max_lng).contains(&point.lng())
            && (self.min_lat..=self.max_lat).contains(&point.lat())
    }
}

/// Resolves where an uploaded cat picture was taken.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(
        &self,
        upload: Option<&Upload>,
        hint: Option<Coordinates>,
    ) -> Result<Coordinates, GeoError>;
}

/// Uses coordinates supplied with the request, otherwise a configured fallback point.
pub struct FallbackGeolocator {
    default: Coordinates,
}

impl FallbackGeolocator {
    pub fn new(default: Coordinates) -> Self {
        Self { default }
    }
}

#[async_trait]
impl Geolocator for FallbackGeolocator {
    async fn locate(
        &self,
        _upload: Option<&Upload>,
        hint: Option<Coordinates>,
    ) -> Result<Coordinates, GeoError> {
        Ok(hint.unwrap_or(self.default))
    }
}
