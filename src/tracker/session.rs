// SPDX-License-Identifier: MIT

//! In-memory state of one active walk: accumulators and the pending fix buffer.

use crate::distance::haversine_m;
use crate::models::{LocationFix, WalkTotals};
use tokio::time::Instant;

/// State for a walk between a successful start and `end()`.
#[derive(Debug)]
pub struct WalkSession {
    walk_id: String,
    started_at: Instant,
    distance_m: f64,
    duration_s: u64,
    last_fix: Option<LocationFix>,
    buffer: Vec<LocationFix>,
    flush_threshold: usize,
}

impl WalkSession {
    pub fn new(walk_id: String, started_at: Instant, flush_threshold: usize) -> Self {
        Self {
            walk_id,
            started_at,
            distance_m: 0.0,
            duration_s: 0,
            last_fix: None,
            buffer: Vec::with_capacity(flush_threshold),
            flush_threshold: flush_threshold.max(1),
        }
    }

    pub fn walk_id(&self) -> &str {
        &self.walk_id
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration_s(&self) -> u64 {
        self.duration_s
    }

    pub fn last_fix(&self) -> Option<&LocationFix> {
        self.last_fix.as_ref()
    }

    /// Number of fixes waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Accumulate distance from the last-seen fix and buffer the new one.
    ///
    /// Returns the detached buffer when it has reached the flush threshold.
    pub fn record_fix(&mut self, fix: LocationFix) -> Option<Vec<LocationFix>> {
        if let Some(last) = &self.last_fix {
            self.distance_m += haversine_m(last.point(), fix.point());
        }
        self.last_fix = Some(fix);
        self.buffer.push(fix);

        if self.buffer.len() >= self.flush_threshold {
            self.take_batch()
        } else {
            None
        }
    }

    /// Detach everything buffered so far. `None` when there is nothing to send.
    pub fn take_batch(&mut self) -> Option<Vec<LocationFix>> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.flush_threshold),
        ))
    }

    /// Recompute elapsed whole seconds from the start instant.
    pub fn tick(&mut self, now: Instant) -> u64 {
        self.duration_s = now.saturating_duration_since(self.started_at).as_secs();
        self.duration_s
    }

    /// Totals as of `now`.
    pub fn totals(&mut self, now: Instant) -> WalkTotals {
        WalkTotals {
            duration_s: self.tick(now),
            distance_m: self.distance_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn fix(lat: f64, lng: f64) -> LocationFix {
        LocationFix::new(Utc::now(), lat, lng)
    }

    fn session(threshold: usize) -> WalkSession {
        WalkSession::new("walk-1".to_string(), Instant::now(), threshold)
    }

    #[test]
    fn test_first_fix_adds_no_distance() {
        let mut s = session(8);
        assert!(s.record_fix(fix(40.0, -75.0)).is_none());
        assert_eq!(s.distance_m(), 0.0);
        assert_eq!(s.pending(), 1);
        assert!(s.last_fix().is_some());
    }

    #[test]
    fn test_equator_degree_increment() {
        let mut s = session(8);
        s.record_fix(fix(0.0, 0.0));
        s.record_fix(fix(0.0, 1.0));
        assert!((s.distance_m() - 111_194.93).abs() < 0.5);
    }

    #[test]
    fn test_distance_is_monotonic_even_when_backtracking() {
        let mut s = session(100);
        let path = [
            (40.0, -75.0),
            (40.001, -75.0),
            (40.0005, -75.0),
            (40.0005, -75.0),
            (40.0, -75.0),
            (40.002, -75.001),
        ];
        let mut previous = 0.0;
        for (lat, lng) in path {
            s.record_fix(fix(lat, lng));
            assert!(s.distance_m() >= previous);
            previous = s.distance_m();
        }
        // Backtracking adds distance instead of subtracting it.
        assert!(s.distance_m() > 2.0 * 111.0);
    }

    #[test]
    fn test_threshold_detaches_full_buffer() {
        let mut s = session(8);
        for i in 0..7 {
            assert!(s.record_fix(fix(40.0 + i as f64 * 1e-4, -75.0)).is_none());
        }
        let batch = s.record_fix(fix(40.0008, -75.0)).expect("eighth fix should flush");

        assert_eq!(batch.len(), 8);
        assert_eq!(batch[0].lat, 40.0);
        assert_eq!(s.pending(), 0);
        // Distance and last fix survive the flush.
        assert!(s.distance_m() > 0.0);
        assert_eq!(s.last_fix().map(|f| f.lat), Some(40.0008));
    }

    #[test]
    fn test_take_batch_on_empty_buffer_is_none() {
        let mut s = session(8);
        assert!(s.take_batch().is_none());

        s.record_fix(fix(40.0, -75.0));
        assert_eq!(s.take_batch().map(|b| b.len()), Some(1));
        assert!(s.take_batch().is_none());
    }

    #[test]
    fn test_scenario_three_fixes_north() {
        let mut s = session(8);
        s.record_fix(fix(40.0, -75.0));
        s.record_fix(fix(40.001, -75.0));
        s.record_fix(fix(40.002, -75.0));

        let expected = 222.39;
        assert!((s.distance_m() - expected).abs() < expected * 0.05);
    }

    #[test]
    fn test_duration_truncates_to_whole_seconds() {
        let start = Instant::now();
        let mut s = WalkSession::new("walk-1".to_string(), start, 8);

        assert_eq!(s.tick(start + Duration::from_millis(2_999)), 2);
        assert_eq!(s.tick(start + Duration::from_secs(30)), 30);

        let totals = s.totals(start + Duration::from_millis(61_500));
        assert_eq!(totals.duration_s, 61);
        assert_eq!(totals.distance_m, 0.0);
    }

    #[test]
    fn test_zero_threshold_is_treated_as_one() {
        let mut s = session(0);
        assert_eq!(s.record_fix(fix(40.0, -75.0)).map(|b| b.len()), Some(1));
    }
}
