//! HTTP wrapper for Wayfarer migration runs.
//!
//! A thin axum router that accepts a [`RunRequest`](wayfarer_migration::RunRequest)
//! as JSON and answers with the run's response. All behaviour lives in the
//! orchestrator; this crate only maps errors to status codes.
//!
//! # Routes
//!
//! - `GET /health` - liveness probe
//! - `POST /api/media/migrate` - run a migration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod error;

pub use api::{create_router, serve, ApiState};
pub use error::ApiError;
