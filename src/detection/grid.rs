//! Sparse hash grid for detector lookups

use ahash::AHashMap;

use crate::core::types::{ActorId, CellPos};

/// Sparse hash grid bucketing detectors by position
///
/// The cell size must be at least the largest detection range in the grid.
/// Then every detector that can reach a target sits in the 3x3 bucket
/// neighborhood around the target's bucket, and the neighborhood scan is
/// exact rather than approximate.
#[derive(Debug, Clone)]
pub struct DetectorGrid {
    cell_size: i32,
    cells: AHashMap<(i32, i32), Vec<ActorId>>,
}

impl DetectorGrid {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1) as i32,
            cells: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size as u32
    }

    #[inline]
    fn bucket(&self, pos: CellPos) -> (i32, i32) {
        (
            pos.x.div_euclid(self.cell_size),
            pos.y.div_euclid(self.cell_size),
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, detector: ActorId, pos: CellPos) {
        let bucket = self.bucket(pos);
        self.cells.entry(bucket).or_default().push(detector);
    }

    /// Query all detectors in neighboring buckets (3x3 neighborhood)
    pub fn query_neighbors(&self, pos: CellPos) -> impl Iterator<Item = ActorId> + '_ {
        let (cx, cy) = self.bucket(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells
                    .get(&(cx.wrapping_add(dx), cy.wrapping_add(dy)))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Rebuild grid from positions with a new cell size
    pub fn rebuild(&mut self, cell_size: u32, detectors: impl Iterator<Item = (ActorId, CellPos)>) {
        self.cell_size = cell_size.max(1) as i32;
        self.clear();
        for (detector, pos) in detectors {
            self.insert(detector, pos);
        }
    }
}
