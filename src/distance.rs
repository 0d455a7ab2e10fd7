// SPDX-License-Identifier: MIT

//! Great-circle distance on a spherical earth.

use geo::{Coord, LineString, Point};

/// Mean earth radius used for all walk distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two points (x = longitude, y = latitude, degrees).
pub fn haversine_m(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points. NaN stays NaN.
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Sum of pairwise haversine distances along a line string.
pub fn path_length_m(line: &LineString<f64>) -> f64 {
    line.0
        .windows(2)
        .map(|pair| haversine_m(to_point(pair[0]), to_point(pair[1])))
        .sum()
}

fn to_point(coord: Coord<f64>) -> Point<f64> {
    Point::from(coord)
}
