//! Block catalog: per-kind role, health, mass, and cell shapes.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;

pub use registry::{BlockId, BlockRegistry, BlockRole, BlockShape, BlockType};
