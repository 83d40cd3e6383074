//! `sheetsync-sheets` — Google Sheets adapter.
//!
//! Blocking reqwest client (no Tokio runtime required in this crate).
//! Covers the whole remote surface the pipeline needs: service-account
//! token grant, workbook lookup by title, worksheet fetch, and the
//! clear-then-write overwrite of a destination worksheet.

pub mod auth;
pub mod client;

pub use auth::{fetch_access_token, ServiceAccountKey};
pub use client::{Endpoints, SheetsClient, SheetsError};
