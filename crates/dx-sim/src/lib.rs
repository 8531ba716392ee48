//! Digitalization maturity simulator.
//!
//! The crate compares three modes of handling civic paperwork (Plain, Smart, AI).
//! [`dataset`] turns raw JSON into a canonical catalog, [`simulation`] holds the pure
//! metrics engine, [`state`] owns the user's flags and persisted snapshots, and
//! [`service`] ties them together behind an HTTP router.

pub mod config;
pub mod dataset;
pub mod error;
pub mod report;
pub mod service;
pub mod simulation;
pub mod state;
pub mod telemetry;
