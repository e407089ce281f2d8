//! Serde-facing catalog schema, compiled into `BlockRegistry`.

use serde::Deserialize;

use keel_grid::FaceSet;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub blocks: Vec<BlockDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockDef {
    pub name: String,
    /// structural | mainframe | ability | weapon; defaults to structural.
    pub role: Option<String>,
    pub health: u32,
    pub mass: f32,
    /// Connect-faces for a single-cell block.
    pub connects: Option<Vec<String>>,
    /// Cells of a multi-cell block; exactly one must sit at (0,0,0).
    pub cells: Option<Vec<CellDef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellDef {
    pub offset: [i32; 3],
    pub connects: Vec<String>,
}

/// Face-name union: the six faces plus the x/y/z/all composites.
pub fn parse_connects(names: &[String]) -> Result<FaceSet, String> {
    use keel_grid::Face;
    let mut set = FaceSet::NONE;
    for name in names {
        set |= match name.as_str() {
            "right" => FaceSet::from(Face::Right),
            "left" => FaceSet::from(Face::Left),
            "top" => FaceSet::from(Face::Top),
            "bottom" => FaceSet::from(Face::Bottom),
            "front" => FaceSet::from(Face::Front),
            "back" => FaceSet::from(Face::Back),
            "x" => FaceSet::X,
            "y" => FaceSet::Y,
            "z" => FaceSet::Z,
            "all" => FaceSet::ALL,
            other => return Err(format!("unknown face name `{other}`")),
        };
    }
    Ok(set)
}
