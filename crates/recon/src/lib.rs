//! `sheetsync-recon` — Pure reconciliation engine.
//!
//! Receives pre-loaded tables, returns the net-new rows plus counts.
//! No HTTP or remote-service dependencies.

pub mod config;
pub mod engine;
pub mod error;

pub use config::ReconConfig;
pub use engine::{reconcile, ReconOutcome};
pub use error::{MissingColumn, ReconError};
