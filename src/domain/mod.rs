//! Domain layer: entity models, errors, and ports.

pub mod errors;
pub mod models;
pub mod ports;
