//! Rules - actor type and faction definitions loaded from TOML

pub mod actor_rules;
pub mod loader;

pub use actor_rules::{ActorType, DetectCloakedConfig, FactionRules};
pub use loader::RulesCatalog;
