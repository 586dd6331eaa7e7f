//! # provisioner
//!
//! Idempotent batch provisioning: an ordered list of work items, each with
//! an existence check and a single side effect, run sequentially into a
//! success/skip/failure report.
//!
//! Ships two kinds of work: static image downloads over HTTP and the
//! quotes table schema plus seed rows in Postgres.

pub mod assets;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod model;
pub mod telemetry;
