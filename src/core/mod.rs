pub mod config;
pub mod error;
pub mod types;

pub use error::{CloakError, Result};
pub use types::{ActorId, CellPos, Color, DamageState, FactionId, Tick};
