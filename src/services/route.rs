// SPDX-License-Identifier: MIT

//! Route reconstruction from stored walk points.

use crate::distance::path_length_m;
use crate::models::WalkPoint;
use geo::{Coord, LineString};

/// Polyline precision used for encoded routes (1e-5 degrees).
pub const POLYLINE_PRECISION: u32 = 5;

/// A walk's stored route in the encodings the frontend consumes.
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub point_count: usize,
    /// Haversine length of the stored points. Can be shorter than the
    /// tracker's reported distance when batches were lost in transit.
    pub distance_m: f64,
    pub polyline: String,
    pub geometry: Option<geojson::Geometry>,
}

/// Build the route line from points in arrival order.
pub fn route_line(points: &[WalkPoint]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord {
            x: p.fix.lng,
            y: p.fix.lat,
        })
        .collect()
}

/// Summarize a walk's stored points.
pub fn summarize(points: &[WalkPoint]) -> Result<RouteSummary, RouteError> {
    let line = route_line(points);

    let polyline = polyline::encode_coordinates(line.coords().copied(), POLYLINE_PRECISION)
        .map_err(|e| RouteError::Encoding(e.to_string()))?;

    // A GeoJSON LineString needs at least two positions.
    let geometry = (line.0.len() >= 2).then(|| geojson::Geometry::new(geojson::Value::from(&line)));

    Ok(RouteSummary {
        point_count: points.len(),
        distance_m: path_length_m(&line),
        polyline,
        geometry,
    })
}

/// Errors from route reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Failed to encode polyline: {0}")]
    Encoding(String),
}
