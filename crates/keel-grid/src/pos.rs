use std::fmt;

use keel_geom::Vec3;
use thiserror::Error;

use crate::face::Face;

/// Grid extent per axis; positions are 7-bit components.
pub const GRID_SIZE: i32 = 128;
pub const GRID_MAX: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("coordinate ({x}, {y}, {z}) is outside the 0..=127 grid")]
pub struct BoundsError {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// A cell position on the build grid. Components are always in 0..=127;
/// construction rejects anything else rather than clamping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Result<GridPos, BoundsError> {
        let range = 0..GRID_SIZE;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Ok(GridPos {
                x: x as u8,
                y: y as u8,
                z: z as u8,
            })
        } else {
            Err(BoundsError { x, y, z })
        }
    }

    /// Steps by a signed delta; fails at the grid boundary, never wraps.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Result<GridPos, BoundsError> {
        GridPos::new(
            i32::from(self.x) + dx,
            i32::from(self.y) + dy,
            i32::from(self.z) + dz,
        )
    }

    pub fn offset_by_face(self, face: Face) -> Result<GridPos, BoundsError> {
        let (dx, dy, dz) = face.dir();
        self.offset(dx, dy, dz)
    }

    /// Center of the cell in local float space.
    #[inline]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f32::from(self.x) + 0.5,
            f32::from(self.y) + 0.5,
            f32::from(self.z) + 0.5,
        )
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
