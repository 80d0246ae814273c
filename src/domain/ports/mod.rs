//! Ports: trait seams between the domain and the outside world.

pub mod entity_client;

pub use entity_client::EntityClient;
