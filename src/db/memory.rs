// SPDX-License-Identifier: MIT

//! In-memory walk store with per-user row scoping.
//!
//! Provides typed operations for:
//! - Walks (one row per tracked session)
//! - Walk points (route history, appended in batches)
//! - Dogs (profiles walks can be attached to)
//!
//! Every walk read and write takes the calling user's id and matches on
//! both the walk id and the owner, so rows of other accounts behave as if
//! they did not exist.

use crate::models::{Dog, LocationFix, Walk, WalkPoint, WalkTotals};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Walk database. Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    walks: Arc<DashMap<Uuid, Walk>>,
    points: Arc<DashMap<Uuid, Vec<WalkPoint>>>,
    dogs: Arc<DashMap<String, Dog>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Walk Operations ─────────────────────────────────────────

    /// Insert a new walk row.
    pub fn insert_walk(&self, walk: Walk) {
        tracing::debug!(walk_id = %walk.id, user_id = %walk.user_id, "Inserting walk");
        self.walks.insert(walk.id, walk);
    }

    /// Get one of the user's walks.
    pub fn get_walk(&self, user_id: Uuid, walk_id: Uuid) -> Option<Walk> {
        self.walks
            .get(&walk_id)
            .filter(|w| w.user_id == user_id)
            .map(|w| w.clone())
    }

    /// Record final totals. Returns `false` when no walk of this user matched.
    pub fn end_walk(
        &self,
        user_id: Uuid,
        walk_id: Uuid,
        totals: WalkTotals,
        ended_at: DateTime<Utc>,
    ) -> bool {
        match self.walks.get_mut(&walk_id) {
            Some(mut walk) if walk.user_id == user_id => {
                walk.ended_at = Some(ended_at);
                walk.total_duration_s = Some(totals.duration_s);
                walk.total_distance_m = Some(totals.distance_m);
                true
            }
            _ => false,
        }
    }

    /// List the user's walks, newest first, optionally for one dog.
    pub fn list_walks(&self, user_id: Uuid, dog_id: Option<&str>) -> Vec<Walk> {
        let mut walks: Vec<Walk> = self
            .walks
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| dog_id.is_none_or(|d| w.dog_id.as_deref() == Some(d)))
            .map(|w| w.clone())
            .collect();

        walks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        walks
    }

    /// Number of walks that have not been ended, across all users.
    pub fn count_in_progress(&self) -> usize {
        self.walks.iter().filter(|w| w.is_in_progress()).count()
    }

    // ─── Point Operations ────────────────────────────────────────

    /// Append a batch to a walk's route, preserving batch order.
    ///
    /// Returns the number of stored points for the walk afterwards, or `None`
    /// when no walk of this user matched.
    pub fn append_points(
        &self,
        user_id: Uuid,
        walk_id: Uuid,
        fixes: &[LocationFix],
    ) -> Option<usize> {
        if self.get_walk(user_id, walk_id).is_none() {
            return None;
        }

        let mut route = self.points.entry(walk_id).or_default();
        let first_seq = route.len() as u64;
        route.extend(fixes.iter().enumerate().map(|(i, fix)| WalkPoint {
            walk_id,
            user_id,
            seq: first_seq + i as u64,
            fix: *fix,
        }));

        Some(route.len())
    }

    /// Stored route of one of the user's walks, in arrival order.
    pub fn walk_points(&self, user_id: Uuid, walk_id: Uuid) -> Option<Vec<WalkPoint>> {
        self.get_walk(user_id, walk_id)?;
        Some(
            self.points
                .get(&walk_id)
                .map(|route| route.clone())
                .unwrap_or_default(),
        )
    }

    // ─── Dog Operations ──────────────────────────────────────────

    pub fn insert_dog(&self, dog: Dog) {
        self.dogs.insert(dog.id.clone(), dog);
    }

    pub fn get_dog(&self, dog_id: &str) -> Option<Dog> {
        self.dogs.get(dog_id).map(|d| d.clone())
    }

    /// Dogs owned by the account with this email, by name.
    pub fn list_dogs_for_owner(&self, email: &str) -> Vec<Dog> {
        let mut dogs: Vec<Dog> = self
            .dogs
            .iter()
            .filter(|d| {
                d.owner_email
                    .as_deref()
                    .is_some_and(|owner| owner.eq_ignore_ascii_case(email))
            })
            .map(|d| d.clone())
            .collect();

        dogs.sort_by(|a, b| a.name.cmp(&b.name));
        dogs
    }
}
