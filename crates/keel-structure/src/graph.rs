use std::collections::HashMap;

use keel_blocks::BlockId;
use keel_grid::{FaceSet, GridPos, Rotation};

/// One occupied grid cell. Multi-cell blocks store their shared state on
/// the origin ("real") cell; the other cells are parts holding the
/// parent's coordinate as a lookup key, never an ownership edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Real(RealCell),
    Part { parent: GridPos, connects: FaceSet },
}

impl Cell {
    /// Resolved (rotated) connect-faces of this cell.
    #[inline]
    pub fn connects(&self) -> FaceSet {
        match self {
            Cell::Real(real) => real.connects,
            Cell::Part { connects, .. } => *connects,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealCell {
    pub block: BlockId,
    pub rot: Rotation,
    pub connects: FaceSet,
    /// Coordinates of this placement's part cells (empty for single-cell).
    pub parts: Vec<GridPos>,
}

/// Everything a removal took out of the graph, for scalar bookkeeping.
#[derive(Clone, Debug)]
pub struct RemovedPlacement {
    pub origin: GridPos,
    pub block: BlockId,
    pub rot: Rotation,
    pub cells: Vec<GridPos>,
}

/// Coordinate-keyed cell arena shared by the editable and complete
/// structure variants. All placement mutations are atomic over the
/// placement's full cell list.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct StructureGraph {
    cells: HashMap<GridPos, Cell>,
}

impl StructureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity accessor mirroring the structure wrappers' `graph()`.
    pub fn graph(&self) -> &StructureGraph {
        self
    }

    /// Occupied cell count, parts included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    #[inline]
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Resolves any occupied cell to its placement's real cell.
    pub fn real_at(&self, pos: GridPos) -> Option<(GridPos, &RealCell)> {
        match self.cells.get(&pos)? {
            Cell::Real(real) => Some((pos, real)),
            Cell::Part { parent, .. } => match self.cells.get(parent)? {
                Cell::Real(real) => Some((*parent, real)),
                Cell::Part { .. } => None,
            },
        }
    }

    /// Inserts a placement; `cells` is the rotated cell list with the
    /// origin first. Callers have already validated occupancy, so a
    /// filled target cell here is corruption.
    pub fn insert_placement(&mut self, block: BlockId, rot: Rotation, cells: &[(GridPos, FaceSet)]) {
        let (origin, origin_connects) = cells[0];
        let mut parts = Vec::with_capacity(cells.len() - 1);
        for &(pos, connects) in &cells[1..] {
            let prev = self.cells.insert(pos, Cell::Part { parent: origin, connects });
            assert!(prev.is_none(), "placement overwrote occupied cell {pos}");
            parts.push(pos);
        }
        let prev = self.cells.insert(
            origin,
            Cell::Real(RealCell {
                block,
                rot,
                connects: origin_connects,
                parts,
            }),
        );
        assert!(prev.is_none(), "placement overwrote occupied cell {origin}");
    }

    /// Removes the whole placement covering `pos`, all cells at once.
    /// An empty position is a caller contract breach.
    pub fn remove_placement(&mut self, pos: GridPos) -> RemovedPlacement {
        let Some((origin, _)) = self.real_at(pos) else {
            panic!("no block at {pos}");
        };
        let Some(Cell::Real(real)) = self.cells.remove(&origin) else {
            unreachable!("real_at returned a non-real origin");
        };
        let mut removed_cells = Vec::with_capacity(real.parts.len() + 1);
        removed_cells.push(origin);
        for part in &real.parts {
            self.cells.remove(part);
            removed_cells.push(*part);
        }
        RemovedPlacement {
            origin,
            block: real.block,
            rot: real.rot,
            cells: removed_cells,
        }
    }

    /// Real cells only, one per placement.
    pub fn real_blocks(&self) -> impl Iterator<Item = (GridPos, &RealCell)> {
        self.cells.iter().filter_map(|(pos, cell)| match cell {
            Cell::Real(real) => Some((*pos, real)),
            Cell::Part { .. } => None,
        })
    }

    pub fn real_len(&self) -> usize {
        self.real_blocks().count()
    }

    /// Every occupied coordinate, parts included.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.keys().copied()
    }
}
