use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{patcher::Topology, utilities::serialized_data::SerializedData};

/// Settings for the capture recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
	/// Directory new capture files are created in. It must already exist.
	pub output_directory: PathBuf,

	/// File extension given to capture files
	#[serde(default = "default_extension")]
	pub extension: String,

	/// How many unread events a slow subscriber may fall behind by
	#[serde(default = "default_event_capacity")]
	pub event_capacity: usize,
}

fn default_extension() -> String {
	return String::from("led");
}

fn default_event_capacity() -> usize {
	return 64;
}

impl CaptureConfig {
	pub fn new(output_directory: impl Into<PathBuf>) -> Self {
		return CaptureConfig {
			output_directory: output_directory.into(),
			extension: default_extension(),
			event_capacity: default_event_capacity(),
		};
	}

	pub fn from_serialized(data: SerializedData) -> anyhow::Result<Self> {
		return data
			.deserialize()
			.context("An error occurred while loading the capture configuration");
	}
}

/// Loads a topology from a CBOR or JSON document
pub fn load_topology(data: SerializedData) -> anyhow::Result<Topology> {
	return data
		.deserialize()
		.context("An error occurred while loading the pixel topology");
}
