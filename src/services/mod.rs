// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod route;

pub use route::{summarize, RouteError, RouteSummary};
