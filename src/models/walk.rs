// SPDX-License-Identifier: MIT

//! Walk session records and the walk API wire types.

use crate::models::LocationFix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stored walk row.
#[derive(Debug, Clone)]
pub struct Walk {
    pub id: Uuid,
    /// Owner; every read and write is scoped to this user.
    pub user_id: Uuid,
    pub dog_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_duration_s: Option<u64>,
    pub total_distance_m: Option<f64>,
}

impl Walk {
    pub fn new(user_id: Uuid, dog_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            dog_id,
            created_at: Utc::now(),
            ended_at: None,
            total_duration_s: None,
            total_distance_m: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Final totals reported by the tracker when a walk ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkTotals {
    pub duration_s: u64,
    pub distance_m: f64,
}

// ─── Wire types ──────────────────────────────────────────────

/// `POST /walks/start` body. An empty object is valid.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWalkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dog_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWalkResponse {
    pub walk_id: String,
}

/// `POST /walks/points` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendPointsRequest {
    pub walk_id: String,
    #[validate(length(min = 1), nested)]
    pub points: Vec<LocationFix>,
}

/// `POST /walks/end` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndWalkRequest {
    pub walk_id: String,
    pub duration_s: u64,
    #[validate(range(min = 0.0))]
    pub distance_m: f64,
}

impl EndWalkRequest {
    pub fn new(walk_id: impl Into<String>, totals: WalkTotals) -> Self {
        Self {
            walk_id: walk_id.into(),
            duration_s: totals.duration_s,
            distance_m: totals.distance_m,
        }
    }
}

/// Acknowledgement body for point and end calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_camel_case() {
        let body = EndWalkRequest::new(
            "7f1c0b8e-3f0a-4c1e-9d59-2d6f4b0a9e11",
            WalkTotals {
                duration_s: 125,
                distance_m: 222.4,
            },
        );
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["walkId"], "7f1c0b8e-3f0a-4c1e-9d59-2d6f4b0a9e11");
        assert_eq!(value["durationS"], 125);
        assert_eq!(value["distanceM"], 222.4);
    }

    #[test]
    fn test_start_request_accepts_empty_object() {
        let req: StartWalkRequest = serde_json::from_str("{}").unwrap();
        assert!(req.dog_id.is_none());

        let req: StartWalkRequest = serde_json::from_str(r#"{"dogId":"dog-1"}"#).unwrap();
        assert_eq!(req.dog_id.as_deref(), Some("dog-1"));
    }

    #[test]
    fn test_empty_point_batch_fails_validation() {
        let req = AppendPointsRequest {
            walk_id: Uuid::new_v4().to_string(),
            points: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_distance_fails_validation() {
        let req = EndWalkRequest {
            walk_id: Uuid::new_v4().to_string(),
            duration_s: 10,
            distance_m: -1.0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_duration_is_rejected_by_deserialization() {
        let json = r#"{"walkId":"x","durationS":-5,"distanceM":1.0}"#;
        assert!(serde_json::from_str::<EndWalkRequest>(json).is_err());
    }
}
