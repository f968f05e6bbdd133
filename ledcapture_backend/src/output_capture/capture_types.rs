use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::patcher::ConfigurationError;

/// One rendered pixel color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		return Rgb { r, g, b };
	}

	/// Builds a color from wide integer components, keeping only the low byte of each
	pub fn from_components(r: i32, g: i32, b: i32) -> Self {
		return Rgb {
			r: r as u8,
			g: g as u8,
			b: b as u8,
		};
	}

	pub fn components(&self) -> [u8; 3] {
		return [self.r, self.g, self.b];
	}
}

impl From<(u8, u8, u8)> for Rgb {
	fn from((r, g, b): (u8, u8, u8)) -> Self {
		return Rgb { r, g, b };
	}
}

/// What `record_frame` did with a frame it accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
	/// No session is recording, so the frame was ignored
	Idle,
	/// The packed frame was appended to the capture file
	Recorded { bytes: usize },
}

/// An error returned by the capture recorder
#[derive(Error, Debug)]
pub enum CaptureError {
	#[error("No topology has been configured")]
	NotConfigured,
	#[error("A recording session is already running")]
	AlreadyRecording,
	#[error("No recording session is running")]
	NotRecording,
	#[error("Invalid topology:\n{0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Frame holds {received} pixels but the grid needs {expected}; frame dropped")]
	SizeMismatch { expected: usize, received: usize },
	#[error("I/O error on capture file {file_name}:\n{source}")]
	Io {
		file_name: String,
		#[source]
		source: std::io::Error,
	},
}

impl CaptureError {
	/// Returns `true` for errors that leave a running session intact
	pub fn is_recoverable(&self) -> bool {
		return matches!(
			self,
			CaptureError::SizeMismatch { .. } | CaptureError::Io { .. }
		);
	}
}
