// SPDX-License-Identifier: MIT

//! Location fixes captured during a walk.

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// One device position sample, as produced by the geolocation provider and
/// sent to the backend in point batches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationFix {
    /// When the device took the sample (device clock).
    pub ts: DateTime<Utc>,
    #[validate(range(min = -90.0, max = 90.0), custom(function = "validate_finite"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0), custom(function = "validate_finite"))]
    pub lng: f64,
    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Ground speed in m/s. Devices report a negative value when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Degrees clockwise from true north. Negative when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

// Range checks let NaN through.
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

impl LocationFix {
    /// A fix with only a position.
    pub fn new(ts: DateTime<Utc>, lat: f64, lng: f64) -> Self {
        Self {
            ts,
            lat,
            lng,
            accuracy: None,
            speed: None,
            heading: None,
        }
    }

    /// Position as a geo point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// Stored point row.
#[derive(Debug, Clone)]
pub struct WalkPoint {
    pub walk_id: Uuid,
    pub user_id: Uuid,
    /// Arrival order within the walk at the backend.
    pub seq: u64,
    pub fix: LocationFix,
}
