//! Cloak Sim - concealment and cloak detection for a tick-driven tactical simulation

pub mod cloak;
pub mod core;
pub mod detection;
pub mod diplomacy;
pub mod rules;
pub mod simulation;
pub mod visibility;
