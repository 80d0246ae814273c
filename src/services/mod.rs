//! Service layer: coordination logic between ports and adapters.

pub mod entity_coordinator;

pub use entity_coordinator::EntityCoordinator;
