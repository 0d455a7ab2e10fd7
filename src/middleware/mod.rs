// SPDX-License-Identifier: MIT

//! Middleware modules (authentication, response headers).

pub mod auth;
pub mod headers;

pub use auth::require_auth;
