pub mod capture_file;
pub mod capture_types;
pub mod config;
pub mod frame_pump;
pub mod interface;
pub mod packer;
pub mod state;

use crate::patcher::Topology;

use self::{capture_types::CaptureError, config::CaptureConfig, interface::CaptureInterface};

/// Creates a capture recorder, optionally configured with a previously loaded topology.
///
/// The output directory is not created here; a missing directory surfaces when recording starts.
pub fn initialize(
	config: CaptureConfig,
	topology: Option<Topology>,
) -> Result<CaptureInterface, CaptureError> {
	if !config.output_directory.is_dir() {
		log::warn!(
			"Capture directory {} does not exist yet",
			config.output_directory.display()
		);
	}

	let interface = CaptureInterface::new(config);
	if let Some(topology) = topology {
		interface.configure(&topology)?;
	}

	return Ok(interface);
}
