//! CSV image processing service
//!
//! Accepts CSV files listing product image URLs, hands them to a queue-backed
//! worker, tracks each request through a completion webhook and publishes an
//! output CSV linking every input image to its processed copy.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
