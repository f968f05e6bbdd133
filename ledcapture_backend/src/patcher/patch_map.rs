use serde::{Deserialize, Serialize};

use super::{
	types::Topology,
	validation::{validate_topology, ConfigurationError},
};

/// Number of color components stored per pixel in the pixel buffer
pub const COMPONENTS_PER_PIXEL: usize = 3;

/// A universe channel that was claimed more than once while compiling.
///
/// The later claim wins; `replaced_offset` is the pixel buffer offset that lost the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConflict {
	pub universe: usize,
	pub channel: u16,
	pub replaced_offset: usize,
	pub offset: usize,
}

/// Compiled routing table from `(universe, channel)` to a pixel buffer offset.
///
/// Each universe holds one slot per declared channel. `None` marks an unassigned channel,
/// which contributes nothing to a packed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMap {
	width: usize,
	height: usize,
	universes: Vec<Vec<Option<usize>>>,
	assigned_channels: usize,
	conflicts: Vec<PatchConflict>,
}

impl PatchMap {
	/// Validates the topology and compiles it into a patch map
	pub fn compile(topology: &Topology) -> Result<Self, ConfigurationError> {
		validate_topology(topology)?;

		let grid = &topology.pixels;
		let mut universes: Vec<Vec<Option<usize>>> = topology
			.universes
			.iter()
			.map(|universe| vec![None; universe.channel_count as usize])
			.collect();
		let mut conflicts = Vec::new();

		for x in 0..grid.width {
			for y in 0..grid.height {
				let assignment = &grid.assignments[x * grid.height + y];
				let base = (y * grid.width + x) * COMPONENTS_PER_PIXEL;
				let slots = &mut universes[assignment.universe];

				for (component, channel) in assignment.channels().into_iter().enumerate() {
					let offset = base + component;
					let slot = &mut slots[channel as usize];
					if let Some(replaced_offset) = slot.replace(offset) {
						log::warn!(
							"Channel {} of universe {} was claimed by offset {} and then by offset {}; keeping the latter",
							channel,
							assignment.universe,
							replaced_offset,
							offset,
						);
						conflicts.push(PatchConflict {
							universe: assignment.universe,
							channel,
							replaced_offset,
							offset,
						});
					}
				}
			}
		}

		let assigned_channels = universes
			.iter()
			.map(|slots| slots.iter().filter(|slot| slot.is_some()).count())
			.sum();

		log::debug!(
			"Compiled patch map for a {}x{} grid across {} universes: {} channels assigned, {} conflicts",
			grid.width,
			grid.height,
			universes.len(),
			assigned_channels,
			conflicts.len(),
		);

		return Ok(PatchMap {
			width: grid.width,
			height: grid.height,
			universes,
			assigned_channels,
			conflicts,
		});
	}

	pub fn width(&self) -> usize {
		return self.width;
	}

	pub fn height(&self) -> usize {
		return self.height;
	}

	pub fn pixel_count(&self) -> usize {
		return self.width * self.height;
	}

	/// Size of the pixel buffer this map indexes into
	pub fn pixel_buffer_len(&self) -> usize {
		return self.pixel_count() * COMPONENTS_PER_PIXEL;
	}

	pub fn universe_count(&self) -> usize {
		return self.universes.len();
	}

	/// Slots for a single universe, in channel order
	pub fn slots(&self, universe: usize) -> Option<&[Option<usize>]> {
		return self.universes.get(universe).map(Vec::as_slice);
	}

	/// Number of assigned slots across every universe, which is also the length of a packed frame
	pub fn assigned_channels(&self) -> usize {
		return self.assigned_channels;
	}

	pub fn conflicts(&self) -> &[PatchConflict] {
		return &self.conflicts;
	}

	/// Pixel buffer offsets in packing order: universes ascending, then channels ascending,
	/// skipping unassigned slots.
	pub fn packing_order(&self) -> impl Iterator<Item = usize> + '_ {
		return self.universes.iter().flatten().filter_map(|slot| *slot);
	}
}
