//! Cloaked-actor visibility
//!
//! Rules are checked in order and the first match wins. The detector scan
//! runs last.
//!
//! Detection is not scoped to the detecting faction: if any detector not
//! allied to the owner covers the actor, every query that reaches the scan
//! sees it.

use crate::cloak::state::Cloak;
use crate::core::types::{CellPos, FactionId};
use crate::detection::registry::DetectionRegistry;
use crate::diplomacy::stance::StanceResolver;
use crate::visibility::observer::ObserverContext;

/// A cloaked actor as seen from outside: its cloak, owner and cell
#[derive(Debug, Clone, Copy)]
pub struct CloakTarget<'a> {
    pub cloak: &'a Cloak,
    pub owner: FactionId,
    pub position: CellPos,
}

/// Read-only visibility queries against one stance table and detector snapshot
pub struct VisibilityResolver<'a, S: StanceResolver> {
    stances: &'a S,
    detectors: &'a DetectionRegistry,
}

impl<'a, S: StanceResolver> VisibilityResolver<'a, S> {
    pub fn new(stances: &'a S, detectors: &'a DetectionRegistry) -> Self {
        Self { stances, detectors }
    }

    /// Can the observer see this actor right now?
    pub fn is_visible(&self, target: &CloakTarget<'_>, ctx: &ObserverContext) -> bool {
        if !target.cloak.is_cloaked() {
            return true;
        }

        if ctx.is_omniscient() {
            return true;
        }

        if let Some(viewer) = ctx.viewer() {
            if self.is_friendly(target.owner, viewer) {
                return true;
            }
        }

        if let Some(player) = ctx.local_player {
            if self.is_friendly(target.owner, player) {
                return true;
            }
        }

        self.is_detected(target)
    }

    /// Owner itself, or a faction the owner regards as an ally
    fn is_friendly(&self, owner: FactionId, other: FactionId) -> bool {
        owner == other || self.stances.is_allied(owner, other)
    }

    /// Is the actor inside range of a detector not allied to its owner?
    pub fn is_detected(&self, target: &CloakTarget<'_>) -> bool {
        self.detectors.any_in_range(target.position, |d| {
            !self.stances.is_allied(d.owner, target.owner)
        })
    }
}
