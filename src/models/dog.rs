// SPDX-License-Identifier: MIT

//! Dog profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Dog profile. Walks may be attached to one.
#[derive(Debug, Clone)]
pub struct Dog {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    /// Email of the owning account. Profiles without one are shared.
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dog {
    /// Whether an account with `email` may start walks for this dog.
    pub fn is_accessible_by(&self, email: Option<&str>) -> bool {
        match self.owner_email.as_deref() {
            None => true,
            Some(owner) => email.is_some_and(|e| e.eq_ignore_ascii_case(owner)),
        }
    }
}

/// `POST /api/dogs` body.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateDogRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub breed: Option<String>,
}
