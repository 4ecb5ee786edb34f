//! Agent configuration
//!
//! Immutable tunables for polling, extraction, and reporting.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::AgentConfigBuilder;
pub use types::AgentConfig;
