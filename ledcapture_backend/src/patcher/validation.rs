use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Topology;

/// A topology that cannot be compiled into a patch map
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ConfigurationError {
	#[error("The topology does not define any universes")]
	NoUniverses,
	#[error("Column {column} of the pixel grid has {received} rows, expected {expected}")]
	RaggedGrid {
		column: usize,
		expected: usize,
		received: usize,
	},
	#[error("The pixel grid holds {received} assignments, expected {expected}")]
	GridSizeMismatch {
		expected: usize,
		received: usize,
	},
	#[error("Pixel ({x}, {y}) references universe {universe}, but only {universes} are defined")]
	UniverseOutOfRange {
		x: usize,
		y: usize,
		universe: usize,
		universes: usize,
	},
	#[error("Pixel ({x}, {y}) references channel {channel} of universe {universe}, which only has {channel_count} channels")]
	ChannelOutOfRange {
		x: usize,
		y: usize,
		universe: usize,
		channel: u16,
		channel_count: u16,
	},
}

/// Checks that every assignment in the topology lands inside a declared universe and channel.
///
/// Returns the first violation found, scanning pixels in compile order (x outer, y inner).
pub fn validate_topology(topology: &Topology) -> Result<(), ConfigurationError> {
	if topology.universes.is_empty() {
		return Err(ConfigurationError::NoUniverses);
	}

	let grid = &topology.pixels;
	if grid.assignments.len() != grid.pixel_count() {
		return Err(ConfigurationError::GridSizeMismatch {
			expected: grid.pixel_count(),
			received: grid.assignments.len(),
		});
	}

	for x in 0..grid.width {
		for y in 0..grid.height {
			let assignment = &grid.assignments[x * grid.height + y];
			let universe = topology.universes.get(assignment.universe).ok_or_else(|| {
				ConfigurationError::UniverseOutOfRange {
					x,
					y,
					universe: assignment.universe,
					universes: topology.universes.len(),
				}
			})?;

			for channel in assignment.channels() {
				if channel >= universe.channel_count {
					return Err(ConfigurationError::ChannelOutOfRange {
						x,
						y,
						universe: assignment.universe,
						channel,
						channel_count: universe.channel_count,
					});
				}
			}
		}
	}

	return Ok(());
}
