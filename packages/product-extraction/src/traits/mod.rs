//! Core trait abstractions for the extraction library.
//!
//! Ingestors fetch pages; strategies turn a target URL into a record.

pub mod ingestor;
pub mod strategy;
