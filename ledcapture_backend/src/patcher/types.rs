use serde::{Deserialize, Serialize};

use super::validation::ConfigurationError;

/// Describes a single lighting universe, identified by its position in the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseDefinition {
	/// Number of addressable channels in the universe
	pub channel_count: u16,
}

impl UniverseDefinition {
	pub fn new(channel_count: u16) -> Self {
		return UniverseDefinition { channel_count };
	}
}

/// The universe and channels a single pixel is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelAssignment {
	/// Index into the topology's universe list
	pub universe: usize,
	pub red: u16,
	pub green: u16,
	pub blue: u16,
}

impl PixelAssignment {
	pub fn new(universe: usize, red: u16, green: u16, blue: u16) -> Self {
		return PixelAssignment {
			universe,
			red,
			green,
			blue,
		};
	}

	/// Assigns red, green and blue to three consecutive channels starting at `first_channel`.
	///
	/// Returns `None` if the blue channel would not fit in a `u16`.
	pub fn consecutive(universe: usize, first_channel: u16) -> Option<Self> {
		let green = first_channel.checked_add(1)?;
		let blue = first_channel.checked_add(2)?;
		return Some(PixelAssignment::new(universe, first_channel, green, blue));
	}

	/// Channels in component order (red, green, blue)
	pub fn channels(&self) -> [u16; 3] {
		return [self.red, self.green, self.blue];
	}
}

/// Pixel assignments for a `width` x `height` grid.
///
/// Assignments are stored x-major: pixel `(x, y)` lives at `x * height + y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentGrid {
	pub width: usize,
	pub height: usize,
	pub assignments: Vec<PixelAssignment>,
}

impl AssignmentGrid {
	/// Builds a grid from a list of columns indexed `[x][y]`.
	///
	/// Every column must be the same length as the first.
	pub fn from_columns(columns: Vec<Vec<PixelAssignment>>) -> Result<Self, ConfigurationError> {
		let width = columns.len();
		let height = columns.first().map_or(0, |column| column.len());

		let mut assignments = Vec::with_capacity(width * height);
		for (x, column) in columns.into_iter().enumerate() {
			if column.len() != height {
				return Err(ConfigurationError::RaggedGrid {
					column: x,
					expected: height,
					received: column.len(),
				});
			}
			assignments.extend(column);
		}

		return Ok(AssignmentGrid {
			width,
			height,
			assignments,
		});
	}

	pub fn get(&self, x: usize, y: usize) -> Option<&PixelAssignment> {
		if x >= self.width || y >= self.height {
			return None;
		}
		return self.assignments.get(x * self.height + y);
	}

	pub fn pixel_count(&self) -> usize {
		return self.width * self.height;
	}
}

/// Everything needed to compile a patch map: the universes and the pixels wired into them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
	pub universes: Vec<UniverseDefinition>,
	pub pixels: AssignmentGrid,
}

impl Topology {
	pub fn new(universes: Vec<UniverseDefinition>, pixels: AssignmentGrid) -> Self {
		return Topology { universes, pixels };
	}
}
