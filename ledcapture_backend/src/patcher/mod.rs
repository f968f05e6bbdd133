//! Topology compiler: turns universe definitions and pixel wiring into a [`patch_map::PatchMap`]

pub mod patch_map;
pub mod types;
pub mod validation;

pub use patch_map::{PatchConflict, PatchMap, COMPONENTS_PER_PIXEL};
pub use types::{AssignmentGrid, PixelAssignment, Topology, UniverseDefinition};
pub use validation::{validate_topology, ConfigurationError};
