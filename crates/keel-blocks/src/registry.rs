use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use keel_grid::{BoundsError, FaceSet, GridPos, Rotation, rotate_faces, rotate_offset};

use super::config::{BlockDef, CatalogConfig, parse_connects};

pub type BlockId = u16;

/// Placement-policy class of a block kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlockRole {
    Structural,
    /// The unique root anchor; connectivity is resolved against it.
    Mainframe,
    /// The unique active-ability block.
    Ability,
    /// Weapons; a structure carries only one weapon kind at a time.
    Weapon,
}

#[derive(Clone, Debug)]
pub enum BlockShape {
    Single {
        connects: FaceSet,
    },
    /// Ordered cell list, origin cell first.
    Multi {
        cells: Vec<((i32, i32, i32), FaceSet)>,
    },
}

impl BlockShape {
    pub fn cell_count(&self) -> usize {
        match self {
            BlockShape::Single { .. } => 1,
            BlockShape::Multi { cells } => cells.len(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub role: BlockRole,
    pub health: u32,
    pub mass: f32,
    pub shape: BlockShape,
}

impl BlockType {
    /// Expands a placement to absolute cells with rotated connect-faces,
    /// origin cell first. Fails whole, with no partial result, if any
    /// cell would leave the grid.
    pub fn rotated_cells(
        &self,
        origin: GridPos,
        rot: Rotation,
    ) -> Result<Vec<(GridPos, FaceSet)>, BoundsError> {
        match &self.shape {
            BlockShape::Single { connects } => Ok(vec![(origin, rotate_faces(*connects, rot))]),
            BlockShape::Multi { cells } => {
                let mut out = Vec::with_capacity(cells.len());
                for &(offset, connects) in cells {
                    let (dx, dy, dz) = rotate_offset(offset, rot);
                    let pos = origin.offset(dx, dy, dz)?;
                    out.push((pos, rotate_faces(connects, rot)));
                }
                Ok(out)
            }
        }
    }
}

/// Read-only block catalog, populated once at startup from TOML and
/// shared by reference afterwards.
#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: CatalogConfig = toml::from_str(text)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: CatalogConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::default();
        for def in cfg.blocks.into_iter() {
            let id = reg.blocks.len() as BlockId;
            let ty = compile_block(id, def)?;
            if reg.by_name.contains_key(&ty.name) {
                return Err(format!("duplicate block name `{}`", ty.name).into());
            }
            reg.by_name.insert(ty.name.clone(), id);
            reg.blocks.push(ty);
        }
        Ok(reg)
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    /// Fatal lookup for contexts where the catalog is known complete
    /// (everything after startup).
    pub fn require(&self, id: BlockId) -> &BlockType {
        match self.get(id) {
            Some(ty) => ty,
            None => panic!("block kind {id} is not registered"),
        }
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn compile_block(id: BlockId, def: BlockDef) -> Result<BlockType, Box<dyn Error>> {
    let role = match def.role.as_deref() {
        None | Some("structural") => BlockRole::Structural,
        Some("mainframe") => BlockRole::Mainframe,
        Some("ability") => BlockRole::Ability,
        Some("weapon") => BlockRole::Weapon,
        Some(other) => return Err(format!("block `{}`: unknown role `{other}`", def.name).into()),
    };
    if def.health == 0 {
        return Err(format!("block `{}`: health must be positive", def.name).into());
    }
    if !(def.mass > 0.0) {
        return Err(format!("block `{}`: mass must be positive", def.name).into());
    }
    let shape = match (def.connects, def.cells) {
        (Some(connects), None) => BlockShape::Single {
            connects: parse_connects(&connects)
                .map_err(|e| format!("block `{}`: {e}", def.name))?,
        },
        (None, Some(cell_defs)) => {
            let mut cells = Vec::with_capacity(cell_defs.len());
            for cell in &cell_defs {
                let offset = (cell.offset[0], cell.offset[1], cell.offset[2]);
                if cells.iter().any(|(o, _)| *o == offset) {
                    return Err(format!(
                        "block `{}`: duplicate cell offset {offset:?}",
                        def.name
                    )
                    .into());
                }
                let connects = parse_connects(&cell.connects)
                    .map_err(|e| format!("block `{}`: {e}", def.name))?;
                cells.push((offset, connects));
            }
            // The origin cell carries the placement state; hoist it to the front.
            let origin_idx = cells
                .iter()
                .position(|(o, _)| *o == (0, 0, 0))
                .ok_or_else(|| format!("block `{}`: multi-cell shape has no (0,0,0) cell", def.name))?;
            cells.swap(0, origin_idx);
            BlockShape::Multi { cells }
        }
        (Some(_), Some(_)) => {
            return Err(format!(
                "block `{}`: `connects` and `cells` are mutually exclusive",
                def.name
            )
            .into());
        }
        (None, None) => {
            return Err(format!(
                "block `{}`: needs either `connects` or `cells`",
                def.name
            )
            .into());
        }
    };
    Ok(BlockType {
        id,
        name: def.name,
        role,
        health: def.health,
        mass: def.mass,
        shape,
    })
}
