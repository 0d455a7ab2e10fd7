// SPDX-License-Identifier: MIT

//! Live walk tracker.
//!
//! A [`WalkTracker`] owns one walk at a time. While tracking it:
//! - accumulates haversine distance from every fix on the location feed
//! - recomputes the elapsed duration from the start instant on a tick
//! - buffers fixes and sends them to the backend in batches, either when the
//!   buffer reaches the flush threshold or when the flush interval elapses
//!
//! Route points are best effort: a failed batch is dropped, while distance and
//! duration are always computed locally.
//!
//! The feed, the flush schedule and the tick schedule are driven by one
//! background task per walk. Session state sits behind a mutex that is never
//! held across an await, and batch uploads run in their own tasks so a slow
//! request never holds up fix capture.

pub mod backend;
pub mod location;
pub mod session;

pub use backend::{BackendError, HttpWalkBackend, WalkBackend};
pub use location::{subscription, LocationError, LocationEvent, LocationFeed, LocationSender};
pub use session::WalkSession;

use crate::config::TrackerConfig;
use crate::models::LocationFix;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use validator::Validate;

/// Warning shown to the walker when the final totals could not be recorded.
pub const UNSAVED_WARNING: &str = "session may not have been saved";

/// Tracker operation errors.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("please sign in first")]
    Unauthenticated,

    #[error("a walk is already being tracked")]
    AlreadyTracking,

    #[error("no walk is being tracked")]
    NotTracking,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Point-in-time view of the active walk.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    pub walk_id: String,
    pub distance_m: f64,
    pub duration_s: u64,
    /// Fixes buffered but not yet handed to the backend.
    pub pending: usize,
    pub last_fix: Option<LocationFix>,
}

/// Result of ending a walk.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSummary {
    pub walk_id: String,
    pub duration_s: u64,
    pub distance_m: f64,
    /// Whether the backend acknowledged the final totals.
    pub saved: bool,
}

impl WalkSummary {
    /// Non-fatal warning to surface when the totals were not recorded.
    pub fn warning(&self) -> Option<&'static str> {
        (!self.saved).then_some(UNSAVED_WARNING)
    }
}

/// Live walk tracker. One instance per walk screen.
pub struct WalkTracker<B> {
    inner: Arc<Inner<B>>,
    driver: Option<Driver>,
}

struct Inner<B> {
    backend: B,
    config: TrackerConfig,
    session: Mutex<Option<WalkSession>>,
}

impl<B: WalkBackend> WalkTracker<B> {
    pub fn new(backend: B, config: TrackerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                config,
                session: Mutex::new(None),
            }),
            driver: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    /// Current totals, or `None` when idle.
    pub fn snapshot(&self) -> Option<TrackerSnapshot> {
        self.inner
            .session
            .lock()
            .as_ref()
            .map(|session| TrackerSnapshot {
                walk_id: session.walk_id().to_owned(),
                distance_m: session.distance_m(),
                duration_s: session.duration_s(),
                pending: session.pending(),
                last_fix: session.last_fix().copied(),
            })
    }

    /// Start a walk and begin consuming `feed`.
    ///
    /// On failure the tracker stays idle and `feed` is dropped, which closes
    /// the provider side.
    pub async fn start(
        &mut self,
        dog_id: Option<&str>,
        feed: LocationFeed,
    ) -> Result<String, TrackerError> {
        if self.is_tracking() {
            return Err(TrackerError::AlreadyTracking);
        }

        let walk_id = self
            .inner
            .backend
            .start_walk(dog_id)
            .await
            .map_err(|e| match e {
                BackendError::Unauthenticated | BackendError::Rejected { status: 403, .. } => {
                    tracing::warn!(error = %e, "Walk start refused");
                    TrackerError::Unauthenticated
                }
                other => TrackerError::Backend(other),
            })?;

        *self.inner.session.lock() = Some(WalkSession::new(
            walk_id.clone(),
            Instant::now(),
            self.inner.config.flush_threshold,
        ));
        self.driver = Some(Driver::spawn(Arc::clone(&self.inner), feed));

        tracing::info!(walk_id = %walk_id, dog_id = ?dog_id, "Walk tracking started");
        Ok(walk_id)
    }

    /// Record one fix. Returns `false` (and does nothing) when idle.
    ///
    /// Fixes with a non-finite or out-of-range position are dropped and
    /// logged; they add no distance and are not sent.
    ///
    /// Must be called from within a Tokio runtime: reaching the flush
    /// threshold spawns the batch upload.
    pub fn on_fix(&self, fix: LocationFix) -> bool {
        self.inner.on_fix(fix)
    }

    /// Send everything buffered as one batch.
    ///
    /// Returns the upload task, or `None` when idle or nothing is buffered
    /// (no request is made).
    pub fn flush(&self) -> Option<JoinHandle<()>> {
        self.inner.flush()
    }

    /// Stop tracking and record the walk's totals.
    ///
    /// The tracker is idle afterwards whatever the backend says; a failed
    /// finalize is reported through [`WalkSummary::saved`].
    pub async fn end(&mut self) -> Result<WalkSummary, TrackerError> {
        if let Some(driver) = self.driver.take() {
            driver.shutdown().await;
        }

        let session = self.inner.session.lock().take();
        let Some(mut session) = session else {
            return Err(TrackerError::NotTracking);
        };

        let totals = session.totals(Instant::now());
        let walk_id = session.walk_id().to_owned();

        if let Some(batch) = session.take_batch() {
            if let Err(e) = self.inner.backend.append_points(&walk_id, &batch).await {
                tracing::warn!(
                    walk_id = %walk_id,
                    count = batch.len(),
                    error = %e,
                    "Final point batch dropped"
                );
            }
        }
        drop(session);

        let saved = match self.inner.backend.end_walk(&walk_id, totals).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(walk_id = %walk_id, error = %e, "Failed to record walk totals");
                false
            }
        };

        tracing::info!(
            walk_id = %walk_id,
            duration_s = totals.duration_s,
            distance_m = totals.distance_m,
            saved,
            "Walk tracking ended"
        );

        Ok(WalkSummary {
            walk_id,
            duration_s: totals.duration_s,
            distance_m: totals.distance_m,
            saved,
        })
    }
}

impl<B> Drop for WalkTracker<B> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.handle.abort();
            let pending = self
                .inner
                .session
                .lock()
                .as_ref()
                .map_or(0, WalkSession::pending);
            tracing::warn!(pending, "Walk tracker dropped while tracking");
        }
    }
}

impl<B: WalkBackend> Inner<B> {
    fn on_fix(self: &Arc<Self>, fix: LocationFix) -> bool {
        if let Err(e) = fix.validate() {
            tracing::warn!(error = %e, lat = fix.lat, lng = fix.lng, "Dropping invalid fix");
            return self.session.lock().is_some();
        }

        let full_batch = {
            let mut guard = self.session.lock();
            let Some(session) = guard.as_mut() else {
                tracing::trace!("Ignoring fix while idle");
                return false;
            };
            let batch = session.record_fix(fix);
            session.tick(Instant::now());
            batch.map(|b| (session.walk_id().to_owned(), b))
        };

        if let Some((walk_id, batch)) = full_batch {
            self.send_batch(walk_id, batch);
        }
        true
    }

    fn flush(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let (walk_id, batch) = {
            let mut guard = self.session.lock();
            let session = guard.as_mut()?;
            let batch = session.take_batch()?;
            (session.walk_id().to_owned(), batch)
        };
        Some(self.send_batch(walk_id, batch))
    }

    fn tick(&self) {
        if let Some(session) = self.session.lock().as_mut() {
            session.tick(Instant::now());
        }
    }

    /// Upload a detached batch. Failures drop the batch.
    fn send_batch(self: &Arc<Self>, walk_id: String, batch: Vec<LocationFix>) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            match inner.backend.append_points(&walk_id, &batch).await {
                Ok(()) => {
                    tracing::debug!(walk_id = %walk_id, count = batch.len(), "Point batch sent");
                }
                Err(e) => {
                    tracing::warn!(
                        walk_id = %walk_id,
                        count = batch.len(),
                        error = %e,
                        "Point batch dropped"
                    );
                }
            }
        })
    }
}

/// Background task feeding one walk's session.
struct Driver {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Driver {
    fn spawn<B: WalkBackend>(inner: Arc<Inner<B>>, feed: LocationFeed) -> Self {
        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(drive(inner, feed, stop_rx));
        Self { stop, handle }
    }

    /// Stop the task and wait for it, so no feed event is handled afterwards.
    async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Walk tracker task panicked");
            }
        }
    }
}

async fn drive<B: WalkBackend>(
    inner: Arc<Inner<B>>,
    mut feed: LocationFeed,
    mut stop: oneshot::Receiver<()>,
) {
    let flush_every = non_zero(inner.config.flush_interval);
    let tick_every = non_zero(inner.config.tick_interval);

    let mut flush_timer = time::interval_at(Instant::now() + flush_every, flush_every);
    flush_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick_timer = time::interval_at(Instant::now() + tick_every, tick_every);
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut feed_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,

            event = feed.recv(), if feed_open => match event {
                Some(LocationEvent::Fix(fix)) => {
                    inner.on_fix(fix);
                }
                Some(LocationEvent::Error(e)) => {
                    tracing::warn!(error = %e, "Location provider error");
                }
                None => {
                    tracing::info!("Location feed closed by provider");
                    feed_open = false;
                }
            },

            _ = flush_timer.tick() => {
                inner.flush();
            }

            _ = tick_timer.tick() => inner.tick(),
        }
    }

    feed.unsubscribe();
}

fn non_zero(period: Duration) -> Duration {
    period.max(Duration::from_millis(1))
}
