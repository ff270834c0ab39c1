//! Registry of active cloak detectors
//!
//! Reads happen many times per tick (one scan per visibility query), writes
//! only at spawn, despawn and movement. Writes are queued and applied at the
//! tick boundary by `apply_pending`, so every query within a tick sees the
//! same snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{CloakError, Result};
use crate::core::types::{ActorId, CellPos, FactionId};
use crate::detection::grid::DetectorGrid;

/// An actor able to see through cloaks within `range` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorUnit {
    pub actor: ActorId,
    pub owner: FactionId,
    pub position: CellPos,
    pub range: u32,
}

impl DetectorUnit {
    /// Build a detector from an externally supplied signed range
    ///
    /// A negative range is corrupted rules data, not a runtime condition.
    pub fn new(actor: ActorId, owner: FactionId, position: CellPos, range: i32) -> Result<Self> {
        if range < 0 {
            return Err(CloakError::InvariantViolation(format!(
                "detector {} has negative range {}",
                actor, range
            )));
        }
        Ok(Self {
            actor,
            owner,
            position,
            range: range as u32,
        })
    }

    /// Strictly-less-than range check against the truncated cell distance
    pub fn covers(&self, target: CellPos) -> bool {
        self.position.distance(&target) < self.range
    }
}

#[derive(Debug, Clone)]
enum PendingChange {
    Add(DetectorUnit),
    Remove(ActorId),
    Move(ActorId, CellPos),
}

/// Snapshot-consistent set of active detectors
#[derive(Debug, Clone)]
pub struct DetectionRegistry {
    detectors: BTreeMap<ActorId, DetectorUnit>,
    pending: Vec<PendingChange>,
    grid: DetectorGrid,
    min_cell_size: u32,
}

impl DetectionRegistry {
    pub fn new(min_cell_size: u32) -> Self {
        Self {
            detectors: BTreeMap::new(),
            pending: Vec::new(),
            grid: DetectorGrid::new(min_cell_size),
            min_cell_size: min_cell_size.max(1),
        }
    }

    /// Queue a detector for activation at the next tick boundary
    ///
    /// Re-adding an active actor replaces its detector.
    pub fn queue_add(&mut self, detector: DetectorUnit) {
        self.pending.push(PendingChange::Add(detector));
    }

    /// Queue a detector for removal at the next tick boundary
    pub fn queue_remove(&mut self, actor: ActorId) {
        self.pending.push(PendingChange::Remove(actor));
    }

    /// Queue a position update at the next tick boundary
    pub fn queue_move(&mut self, actor: ActorId, position: CellPos) {
        self.pending.push(PendingChange::Move(actor, position));
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply queued changes in submission order and rebuild the index
    ///
    /// Returns the number of changes that took effect. Removes and moves
    /// for actors that are not active are dropped.
    pub fn apply_pending(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let mut applied = 0;
        for change in std::mem::take(&mut self.pending) {
            match change {
                PendingChange::Add(detector) => {
                    tracing::info!(
                        "Detector {} active (owner {:?}, range {})",
                        detector.actor,
                        detector.owner,
                        detector.range
                    );
                    self.detectors.insert(detector.actor, detector);
                    applied += 1;
                }
                PendingChange::Remove(actor) => {
                    if self.detectors.remove(&actor).is_some() {
                        tracing::info!("Detector {} removed", actor);
                        applied += 1;
                    }
                }
                PendingChange::Move(actor, position) => {
                    if let Some(detector) = self.detectors.get_mut(&actor) {
                        detector.position = position;
                        applied += 1;
                    }
                }
            }
        }

        self.rebuild_index();
        applied
    }

    fn rebuild_index(&mut self) {
        let max_range = self.detectors.values().map(|d| d.range).max().unwrap_or(0);
        let cell_size = self.min_cell_size.max(max_range);
        self.grid.rebuild(
            cell_size,
            self.detectors.values().map(|d| (d.actor, d.position)),
        );
    }

    /// Active detectors in actor order
    pub fn active(&self) -> impl Iterator<Item = &DetectorUnit> + '_ {
        self.detectors.values()
    }

    pub fn get(&self, actor: ActorId) -> Option<&DetectorUnit> {
        self.detectors.get(&actor)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Is any detector accepted by `filter` strictly within range of `target`?
    ///
    /// Uses the grid index; agrees exactly with `any_in_range_scan`.
    pub fn any_in_range(&self, target: CellPos, filter: impl Fn(&DetectorUnit) -> bool) -> bool {
        self.grid
            .query_neighbors(target)
            .filter_map(|actor| self.detectors.get(&actor))
            .any(|d| filter(d) && d.covers(target))
    }

    /// Brute-force version of `any_in_range` over every active detector
    pub fn any_in_range_scan(
        &self,
        target: CellPos,
        filter: impl Fn(&DetectorUnit) -> bool,
    ) -> bool {
        self.detectors
            .values()
            .any(|d| filter(d) && d.covers(target))
    }

    /// All detectors covering `target`, in actor order
    pub fn covering(&self, target: CellPos) -> Vec<&DetectorUnit> {
        let mut found: Vec<&DetectorUnit> = self
            .grid
            .query_neighbors(target)
            .filter_map(|actor| self.detectors.get(&actor))
            .filter(|d| d.covers(target))
            .collect();
        found.sort_by_key(|d| d.actor);
        found
    }
}

impl Default for DetectionRegistry {
    fn default() -> Self {
        Self::new(crate::core::config::config().min_grid_cell_size)
    }
}
