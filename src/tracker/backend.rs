// SPDX-License-Identifier: MIT

//! Walk API client used by the tracker.
//!
//! [`WalkBackend`] is the seam between the tracker and the network;
//! [`HttpWalkBackend`] implements it against the REST endpoints served by
//! this crate's router.

use crate::middleware::auth::SESSION_COOKIE;
use crate::models::walk::{
    AppendPointsRequest, EndWalkRequest, OkResponse, StartWalkRequest, StartWalkResponse,
};
use crate::models::{LocationFix, WalkTotals};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Errors from walk API calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("walk API rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("walk API request failed: {0}")]
    Transport(String),

    #[error("unexpected walk API response: {0}")]
    InvalidResponse(String),
}

/// The three calls a tracker makes over a walk's lifetime.
pub trait WalkBackend: Send + Sync + 'static {
    /// Create a walk session and return its id.
    fn start_walk(
        &self,
        dog_id: Option<&str>,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Append one batch of fixes to the walk's route.
    fn append_points(
        &self,
        walk_id: &str,
        points: &[LocationFix],
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Record the walk's final totals.
    fn end_walk(
        &self,
        walk_id: &str,
        totals: WalkTotals,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

impl<T: WalkBackend> WalkBackend for Arc<T> {
    fn start_walk(
        &self,
        dog_id: Option<&str>,
    ) -> impl Future<Output = Result<String, BackendError>> + Send {
        (**self).start_walk(dog_id)
    }

    fn append_points(
        &self,
        walk_id: &str,
        points: &[LocationFix],
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).append_points(walk_id, points)
    }

    fn end_walk(
        &self,
        walk_id: &str,
        totals: WalkTotals,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).end_walk(walk_id, totals)
    }
}

/// Borrowed form of [`AppendPointsRequest`] so a batch is not cloned to be sent.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendPointsBody<'a> {
    walk_id: &'a str,
    points: &'a [LocationFix],
}

/// Error body returned by the walk API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Walk API client over HTTP.
#[derive(Clone)]
pub struct HttpWalkBackend {
    http: reqwest::Client,
    base_url: String,
    session_token: String,
}

impl HttpWalkBackend {
    /// `base_url` is the API root, e.g. `https://example.com/api`.
    pub fn new(base_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session_token)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: session_token.into(),
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE, self.session_token),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| BackendError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            return Err(BackendError::Unauthenticated);
        }

        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{}: {}", error, details),
            Ok(ErrorBody { error, .. }) => error,
            Err(_) => body,
        };

        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl WalkBackend for HttpWalkBackend {
    async fn start_walk(&self, dog_id: Option<&str>) -> Result<String, BackendError> {
        let body = StartWalkRequest {
            dog_id: dog_id.map(String::from),
        };
        let response: StartWalkResponse = self.post_json("/walks/start", &body).await?;
        Ok(response.walk_id)
    }

    async fn append_points(
        &self,
        walk_id: &str,
        points: &[LocationFix],
    ) -> Result<(), BackendError> {
        let body = AppendPointsBody { walk_id, points };
        let _: OkResponse = self.post_json("/walks/points", &body).await?;
        Ok(())
    }

    async fn end_walk(&self, walk_id: &str, totals: WalkTotals) -> Result<(), BackendError> {
        let body = EndWalkRequest::new(walk_id, totals);
        let _: OkResponse = self.post_json("/walks/end", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpWalkBackend::new("http://localhost:8080/api/", "token");
        assert_eq!(backend.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_borrowed_points_body_matches_owned_request() {
        let points = vec![LocationFix::new(Utc::now(), 40.0, -75.0)];
        let borrowed = serde_json::to_value(AppendPointsBody {
            walk_id: "w",
            points: &points,
        })
        .unwrap();
        let owned = serde_json::to_value(AppendPointsRequest {
            walk_id: "w".to_string(),
            points,
        })
        .unwrap();

        assert_eq!(borrowed, owned);
    }
}
