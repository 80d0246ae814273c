//! HTTP adapter for the remote document API.

pub mod client;
pub mod models;

pub use client::HttpEntityClient;
