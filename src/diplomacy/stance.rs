//! Faction stances (diplomatic relationships)
//!
//! Stances are directional: `stance(a, b)` is how `a` regards `b`. The
//! visibility rules query specific directions, so tables are allowed to be
//! asymmetric even though `set_mutual` is the common case.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::FactionId;

/// Relationship one faction holds toward another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Ally,
    Neutral,
    Enemy,
}

/// Answers stance queries between two factions
pub trait StanceResolver {
    /// How `from` regards `to`
    fn stance(&self, from: FactionId, to: FactionId) -> Stance;

    fn is_allied(&self, from: FactionId, to: FactionId) -> bool {
        self.stance(from, to) == Stance::Ally
    }
}

/// Explicit stance table with a fallback for unlisted pairs
///
/// A faction is always allied with itself.
#[derive(Debug, Clone)]
pub struct StanceTable {
    stances: AHashMap<(FactionId, FactionId), Stance>,
    default_stance: Stance,
}

impl StanceTable {
    /// New table where unlisted pairs are enemies
    pub fn new() -> Self {
        Self::with_default(Stance::Enemy)
    }

    pub fn with_default(default_stance: Stance) -> Self {
        Self {
            stances: AHashMap::new(),
            default_stance,
        }
    }

    /// Set how `from` regards `to` (one direction only)
    pub fn set(&mut self, from: FactionId, to: FactionId, stance: Stance) {
        self.stances.insert((from, to), stance);
    }

    /// Set the same stance in both directions
    pub fn set_mutual(&mut self, a: FactionId, b: FactionId, stance: Stance) {
        self.set(a, b, stance);
        self.set(b, a, stance);
    }
}

impl Default for StanceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StanceResolver for StanceTable {
    fn stance(&self, from: FactionId, to: FactionId) -> Stance {
        if from == to {
            return Stance::Ally;
        }
        self.stances
            .get(&(from, to))
            .copied()
            .unwrap_or(self.default_stance)
    }
}
