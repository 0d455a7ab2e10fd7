// SPDX-License-Identifier: MIT

//! Walk Tracker: record dog walks as live GPS sessions
//!
//! This crate provides the walk tracker client (distance, duration and
//! batched point upload while a walk is in progress) and the backend API
//! that stores walks, their route points and dog profiles.

pub mod config;
pub mod db;
pub mod distance;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod tracker;

use config::Config;
use db::MemoryDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
}
