//! Domain models: the entity shapes the bridge works with.

pub mod config;
pub mod project;
pub mod rule;

pub use config::{ApiConfig, Config, LoggingConfig};
pub use project::{Project, RuleRef, RuleSlot};
pub use rule::{Rule, RulePage};
