//! Infrastructure layer: configuration and process-level concerns.

pub mod config;
