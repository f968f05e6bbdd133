pub mod events;
pub mod output_capture;
pub mod patcher;
pub mod utilities;

#[cfg(test)]
mod tests;

pub use events::{CaptureEvent, EventEmitter};
pub use output_capture::{
	capture_types::{CaptureError, RecordOutcome, Rgb},
	config::CaptureConfig,
	initialize,
	interface::CaptureInterface,
};
pub use patcher::{
	patch_map::PatchMap,
	types::{AssignmentGrid, PixelAssignment, Topology, UniverseDefinition},
};
