//! Structure graphs: build-mode editing and combat-mode damage cascades.
#![forbid(unsafe_code)]

pub mod complete;
pub mod connect;
pub mod editable;
pub mod graph;

pub use complete::{CompleteStructure, Pose, rotate_yaw};
pub use connect::resolve_connected;
pub use editable::{BuildErrors, EditableStructure, PlaceError};
pub use graph::{Cell, RealCell, RemovedPlacement, StructureGraph};
