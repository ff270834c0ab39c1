//! Diplomacy - stance resolution between factions

pub mod stance;

pub use stance::{Stance, StanceResolver, StanceTable};
