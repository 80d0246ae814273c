//! Rulebridge - MCP bridge for a rule-sharing platform.
//!
//! Rulebridge sits between external AI-agent tool-callers and the
//! platform's remote document API. It exposes project and rule lookups as
//! MCP tools, deduplicates fetches through a process-wide entity cache,
//! and writes rule content updates back to the platform.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain Layer** (`domain`): entity models, errors, and ports
//! - **Service Layer** (`services`): the entity cache and fetch coordinator
//! - **Adapters** (`adapters`): the reqwest HTTP client and the MCP stdio server
//! - **Infrastructure** (`infrastructure`): configuration loading
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ApiError, ApiResult};
pub use domain::models::{Config, Project, Rule, RulePage, RuleRef, RuleSlot};
pub use domain::ports::EntityClient;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::EntityCoordinator;
