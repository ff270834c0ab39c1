//! Cloaking - per-actor concealment timers and their cue events

pub mod config;
pub mod events;
pub mod state;

pub use config::CloakConfig;
pub use events::{CloakEvent, CloakEventLog, LoggedCloakEvent};
pub use state::{Cloak, CloakSnapshot, UnitStatus};
