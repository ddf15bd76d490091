//! Data types for the extraction library.

pub mod config;
pub mod page;
pub mod product;
pub mod target;
