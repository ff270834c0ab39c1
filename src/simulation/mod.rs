//! Simulation - the authoritative tick driver for cloaked actors

pub mod world;

pub use world::{CloakWorld, UnitState, FALLBACK_COLOR};
