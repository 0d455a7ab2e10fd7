// SPDX-License-Identifier: MIT

//! Location feed: a cancellable subscription from a geolocation provider
//! to a walk tracker.

use crate::models::LocationFix;
use tokio::sync::mpsc;

/// Default number of events the feed holds before the provider waits.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Errors a geolocation provider can report instead of a fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a position")]
    Timeout,
}

/// One item delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Fix(LocationFix),
    Error(LocationError),
}

/// Returned to the provider once the tracker has unsubscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("location feed unsubscribed")]
pub struct Unsubscribed;

/// Create a connected provider handle and feed.
pub fn subscription(capacity: usize) -> (LocationSender, LocationFeed) {
    let (tx, rx) = mpsc::channel(capacity);
    (LocationSender { tx }, LocationFeed { rx })
}

/// Provider side of the subscription.
#[derive(Debug, Clone)]
pub struct LocationSender {
    tx: mpsc::Sender<LocationEvent>,
}

impl LocationSender {
    pub async fn send_fix(&self, fix: LocationFix) -> Result<(), Unsubscribed> {
        self.send(LocationEvent::Fix(fix)).await
    }

    pub async fn send_error(&self, error: LocationError) -> Result<(), Unsubscribed> {
        self.send(LocationEvent::Error(error)).await
    }

    pub async fn send(&self, event: LocationEvent) -> Result<(), Unsubscribed> {
        self.tx.send(event).await.map_err(|_| Unsubscribed)
    }

    /// True once the tracker has cancelled the subscription.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Tracker side of the subscription.
#[derive(Debug)]
pub struct LocationFeed {
    rx: mpsc::Receiver<LocationEvent>,
}

impl LocationFeed {
    pub(crate) async fn recv(&mut self) -> Option<LocationEvent> {
        self.rx.recv().await
    }

    /// Cancel the subscription. Events still queued are discarded.
    pub(crate) fn unsubscribe(mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}
