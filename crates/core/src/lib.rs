//! `sheetsync-core` — Core types shared by the adapter, engine, and server.
//!
//! One data structure: [`Table`], an ordered header plus string-valued rows.

pub mod table;

pub use table::Table;
