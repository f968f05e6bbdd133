use uuid::Uuid;

use super::{capture_file::CaptureFile, config::CaptureConfig, packer::FramePacker};

/// A single recording, from `start` to `stop`
#[derive(Debug)]
pub struct CaptureSession {
	pub id: Uuid,
	pub file: CaptureFile,
	pub frames_recorded: u64,
	pub failed_writes: u64,
}

impl CaptureSession {
	pub fn new(file: CaptureFile) -> Self {
		return CaptureSession {
			id: Uuid::new_v4(),
			file,
			frames_recorded: 0,
			failed_writes: 0,
		};
	}
}

#[derive(Debug)]
pub enum RecorderState {
	Idle,
	Recording(CaptureSession),
}

/// Internal data held by the capture interface
#[derive(Debug)]
pub struct CaptureContext {
	pub config: CaptureConfig,
	pub packer: Option<FramePacker>,
	pub state: RecorderState,
}

impl CaptureContext {
	pub fn new(config: CaptureConfig) -> Self {
		return CaptureContext {
			config,
			packer: None,
			state: RecorderState::Idle,
		};
	}

	pub fn is_recording(&self) -> bool {
		return matches!(self.state, RecorderState::Recording(_));
	}
}
