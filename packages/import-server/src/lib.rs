// Product Import Server
//
// Accepts a product-page URL over HTTP and answers with a normalized
// product record from the product-extraction pipeline. Caller identity is
// resolved per request and only drives activity logging.

pub mod activity;
pub mod auth;
pub mod config;
pub mod server;

pub use config::*;
