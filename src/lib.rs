//! # histoscan
//!
//! Forensic browser-history classifier. Ingests visit records from a CSV
//! export or a Chromium-family `History` SQLite database, assigns each visit
//! a behavioral category, flags potentially inappropriate content, and checks
//! the visit against a configured work-hours schedule.
//!
//! The classification engine in [`engine`] is pure and total: it never fails
//! on a malformed row, signalling instead through sentinel results. Ingestion,
//! metadata output, and report rendering live in their own modules around it.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod metadata;
pub mod report;
