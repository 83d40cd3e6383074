//! `sheetsync-server` — HTTP facade for the reconciliation pipeline.
//!
//! Two data endpoints on top of a stateless pipeline: `/api/run` fetches,
//! reconciles, and persists the net-new rows; `/api/data` does the same
//! minus the write. Every run re-fetches from the remote source of truth;
//! concurrent requests are fully isolated.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use pipeline::RunSummary;
pub use routes::{build_router, AppState};
