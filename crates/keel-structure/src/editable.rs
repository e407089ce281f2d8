//! Build-mode structure: placement validation and mutation.

use std::collections::HashSet;

use thiserror::Error;

use keel_blocks::{BlockId, BlockRegistry, BlockRole};
use keel_grid::{BoundsError, FaceSet, GridPos, Rotation};

use crate::connect::resolve_connected;
use crate::graph::StructureGraph;

/// Why a placement was refused. Bounds and policy conflicts are all
/// recoverable; the caller just rejects the placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error(transparent)]
    OutOfBounds(#[from] BoundsError),
    #[error("cell {0} is already occupied")]
    Occupied(GridPos),
    #[error("structure already has a mainframe")]
    DuplicateMainframe,
    #[error("structure already has an ability block")]
    DuplicateAbility,
    #[error("structure already carries a different weapon kind")]
    MixedWeapons,
    #[error("no rotated face matches a neighboring connect-face")]
    NotConnected,
}

/// Validity scalars read in O(1) by `errors()`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildErrors {
    pub missing_mainframe: bool,
    pub no_weapon: bool,
}

/// A validated placement, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPlacement {
    block: BlockId,
    rot: Rotation,
    cells: Vec<(GridPos, FaceSet)>,
}

/// The editable, health-less build-mode structure. Three cached scalars
/// (mainframe, ability, committed weapon kind + count) are maintained
/// incrementally by the single place/remove entry points; only
/// `from_graph` recomputes them by full scan.
#[derive(Default, Debug, Clone)]
pub struct EditableStructure {
    graph: StructureGraph,
    mainframe: Option<GridPos>,
    ability: Option<GridPos>,
    weapon: Option<(BlockId, u32)>,
}

impl EditableStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the cached scalars from a loaded graph.
    pub fn from_graph(reg: &BlockRegistry, graph: StructureGraph) -> Self {
        let mut mainframe = None;
        let mut ability = None;
        let mut weapon: Option<(BlockId, u32)> = None;
        for (pos, real) in graph.real_blocks() {
            match reg.require(real.block).role {
                BlockRole::Mainframe => mainframe = Some(pos),
                BlockRole::Ability => ability = Some(pos),
                BlockRole::Weapon => {
                    let entry = weapon.get_or_insert((real.block, 0));
                    entry.1 += 1;
                }
                BlockRole::Structural => {}
            }
        }
        Self {
            graph,
            mainframe,
            ability,
            weapon,
        }
    }

    pub fn graph(&self) -> &StructureGraph {
        &self.graph
    }

    pub fn into_graph(self) -> StructureGraph {
        self.graph
    }

    pub fn mainframe(&self) -> Option<GridPos> {
        self.mainframe
    }

    pub fn weapon_kind(&self) -> Option<BlockId> {
        self.weapon.map(|(kind, _)| kind)
    }

    /// Full placement validation. The very first block of an empty
    /// structure is exempt from the connection requirement.
    pub fn check_place(
        &self,
        reg: &BlockRegistry,
        pos: GridPos,
        block: BlockId,
        rot: Rotation,
    ) -> Result<PlannedPlacement, PlaceError> {
        let ty = reg.require(block);
        let cells = ty.rotated_cells(pos, rot)?;
        for (cell, _) in &cells {
            if self.graph.is_occupied(*cell) {
                return Err(PlaceError::Occupied(*cell));
            }
        }
        match ty.role {
            BlockRole::Mainframe if self.mainframe.is_some() => {
                return Err(PlaceError::DuplicateMainframe);
            }
            BlockRole::Ability if self.ability.is_some() => {
                return Err(PlaceError::DuplicateAbility);
            }
            BlockRole::Weapon => {
                if let Some((kind, _)) = self.weapon {
                    if kind != block {
                        return Err(PlaceError::MixedWeapons);
                    }
                }
            }
            _ => {}
        }
        if !self.graph.is_empty() && !self.connects_somewhere(&cells) {
            return Err(PlaceError::NotConnected);
        }
        Ok(PlannedPlacement { block, rot, cells })
    }

    pub fn can_place(&self, reg: &BlockRegistry, pos: GridPos, block: BlockId, rot: Rotation) -> bool {
        self.check_place(reg, pos, block, rot).is_ok()
    }

    pub fn place(
        &mut self,
        reg: &BlockRegistry,
        pos: GridPos,
        block: BlockId,
        rot: Rotation,
    ) -> Result<(), PlaceError> {
        let plan = self.check_place(reg, pos, block, rot)?;
        self.graph.insert_placement(plan.block, plan.rot, &plan.cells);
        match reg.require(block).role {
            BlockRole::Mainframe => self.mainframe = Some(pos),
            BlockRole::Ability => self.ability = Some(pos),
            BlockRole::Weapon => {
                let entry = self.weapon.get_or_insert((block, 0));
                entry.1 += 1;
            }
            BlockRole::Structural => {}
        }
        Ok(())
    }

    /// `place`, collapsed to the yes/no the build UI needs.
    pub fn try_place(&mut self, reg: &BlockRegistry, pos: GridPos, block: BlockId, rot: Rotation) -> bool {
        match self.place(reg, pos, block, rot) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("placement at {pos} refused: {e}");
                false
            }
        }
    }

    /// Removes the whole placement covering `pos` and re-derives the
    /// cached scalars. An empty position is a caller contract breach.
    pub fn remove(&mut self, reg: &BlockRegistry, pos: GridPos) {
        let removed = self.graph.remove_placement(pos);
        match reg.require(removed.block).role {
            BlockRole::Mainframe => self.mainframe = None,
            BlockRole::Ability => self.ability = None,
            BlockRole::Weapon => {
                if let Some((_, count)) = &mut self.weapon {
                    *count -= 1;
                    if *count == 0 {
                        self.weapon = None;
                    }
                }
            }
            BlockRole::Structural => {}
        }
    }

    pub fn errors(&self) -> BuildErrors {
        BuildErrors {
            missing_mainframe: self.mainframe.is_none(),
            no_weapon: self.weapon.is_none(),
        }
    }

    /// Cells not reachable from the mainframe; `None` when there is no
    /// mainframe to anchor connectivity to.
    pub fn orphans(&self) -> Option<HashSet<GridPos>> {
        let root = self.mainframe?;
        let connected = resolve_connected(&self.graph, root);
        Some(
            self.graph
                .positions()
                .filter(|p| !connected.contains(p))
                .collect(),
        )
    }

    fn connects_somewhere(&self, cells: &[(GridPos, FaceSet)]) -> bool {
        let own: HashSet<GridPos> = cells.iter().map(|(p, _)| *p).collect();
        for (pos, connects) in cells {
            for face in connects.iter() {
                let Ok(neighbor) = pos.offset_by_face(face) else {
                    continue;
                };
                if own.contains(&neighbor) {
                    continue;
                }
                if let Some(cell) = self.graph.cell(neighbor) {
                    if cell.connects().contains(face.opposite()) {
                        return true;
                    }
                }
            }
        }
        false
    }
}
