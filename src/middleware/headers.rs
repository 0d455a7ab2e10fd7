// SPDX-License-Identifier: MIT

//! Response headers for walk API responses.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Live walk data must never be served from a cache.
pub async fn add_api_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    response
}
