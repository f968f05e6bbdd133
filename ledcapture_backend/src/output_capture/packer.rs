use rayon::prelude::*;
use thiserror::Error;

use crate::patcher::{PatchMap, COMPONENTS_PER_PIXEL};

use super::capture_types::Rgb;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
	#[error("Frame holds {received} pixels but the grid needs {expected}")]
	SizeMismatch { expected: usize, received: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackError {
	#[error("Packed frame holds {received} bytes but the patch map assigns {expected} channels")]
	LengthMismatch { expected: usize, received: usize },
}

/// Rejects frames that cannot cover the configured grid.
///
/// Frames with more pixels than the grid are accepted; the excess is ignored.
pub fn check_frame_size(map: &PatchMap, frame: &[Rgb]) -> Result<(), PackError> {
	let expected = map.pixel_count();
	if expected == 0 || expected > frame.len() {
		return Err(PackError::SizeMismatch {
			expected,
			received: frame.len(),
		});
	}
	return Ok(());
}

/// Copies the grid's pixels into `pixel_buffer`, laid out as `(y * width + x) * 3 + component`.
///
/// `pixel_buffer` must be exactly `map.pixel_buffer_len()` bytes and `frame` must already have
/// passed [`check_frame_size`].
fn fill_pixel_buffer(pixel_buffer: &mut [u8], frame: &[Rgb]) {
	let pixel_count = pixel_buffer.len() / COMPONENTS_PER_PIXEL;

	// Use rayon to split the copy by pixel across multiple threads
	pixel_buffer
		.par_chunks_mut(COMPONENTS_PER_PIXEL)
		.zip(frame[..pixel_count].par_iter())
		.for_each(|(pixel, color)| pixel.copy_from_slice(&color.components()));
}

/// Walks the patch map in universe/channel order, emitting the referenced pixel buffer bytes
fn pack_pixel_buffer(map: &PatchMap, pixel_buffer: &[u8], packed: &mut Vec<u8>) {
	packed.clear();
	packed.extend(map.packing_order().map(|offset| pixel_buffer[offset]));
}

/// Packs a single frame without keeping any buffers around
pub fn pack_frame(frame: &[Rgb], map: &PatchMap) -> Result<Vec<u8>, PackError> {
	check_frame_size(map, frame)?;

	let mut pixel_buffer = vec![0u8; map.pixel_buffer_len()];
	fill_pixel_buffer(&mut pixel_buffer, frame);

	let mut packed = Vec::with_capacity(map.assigned_channels());
	pack_pixel_buffer(map, &pixel_buffer, &mut packed);
	return Ok(packed);
}

/// Reverses packing: scatters a packed frame back to pixel buffer positions.
///
/// Components that no channel is patched to come back as `None`.
pub fn unpack_frame(packed: &[u8], map: &PatchMap) -> Result<Vec<Option<u8>>, UnpackError> {
	if packed.len() != map.assigned_channels() {
		return Err(UnpackError::LengthMismatch {
			expected: map.assigned_channels(),
			received: packed.len(),
		});
	}

	let mut pixel_buffer = vec![None; map.pixel_buffer_len()];
	for (offset, value) in map.packing_order().zip(packed.iter()) {
		pixel_buffer[offset] = Some(*value);
	}
	return Ok(pixel_buffer);
}

/// Packs frames against a fixed patch map, reusing its pixel and output buffers between frames.
///
/// Not re-entrant; callers sharing a packer must serialize access to it.
#[derive(Debug, Clone)]
pub struct FramePacker {
	map: PatchMap,
	pixel_buffer: Vec<u8>,
	packed: Vec<u8>,
}

impl FramePacker {
	pub fn new(map: PatchMap) -> Self {
		return FramePacker {
			pixel_buffer: vec![0u8; map.pixel_buffer_len()],
			packed: Vec::with_capacity(map.assigned_channels()),
			map,
		};
	}

	pub fn map(&self) -> &PatchMap {
		return &self.map;
	}

	/// Packs a frame, returning a view of the packed bytes that stays valid until the next call.
	///
	/// A frame that fails the size check leaves both buffers untouched.
	pub fn pack(&mut self, frame: &[Rgb]) -> Result<&[u8], PackError> {
		check_frame_size(&self.map, frame)?;

		#[cfg(feature = "packer-benchmark")]
		let start_bench = std::time::Instant::now();

		fill_pixel_buffer(&mut self.pixel_buffer, frame);
		pack_pixel_buffer(&self.map, &self.pixel_buffer, &mut self.packed);

		#[cfg(feature = "packer-benchmark")]
		log::debug!("Packing took {:?}", start_bench.elapsed());

		return Ok(&self.packed);
	}
}
