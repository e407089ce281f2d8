//! Bounded cube-grid coordinates, face flags, and the discrete rotation codec.
#![forbid(unsafe_code)]

pub mod face;
pub mod pos;
pub mod rot;

pub use face::{Face, FaceSet};
pub use pos::{BoundsError, GRID_MAX, GRID_SIZE, GridPos};
pub use rot::{Rotation, rotate_faces, rotate_offset};
