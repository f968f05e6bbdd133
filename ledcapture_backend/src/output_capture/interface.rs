use std::{
	mem,
	path::PathBuf,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::broadcast::Receiver;

use crate::{
	events::{CaptureEvent, EventEmitter},
	patcher::{PatchMap, Topology},
};

use super::{
	capture_file::{capture_file_name, CaptureFile, CaptureHeader},
	capture_types::{CaptureError, RecordOutcome, Rgb},
	config::CaptureConfig,
	packer::{FramePacker, PackError},
	state::{CaptureContext, CaptureSession, RecorderState},
};

/// The capture recorder's interface, used by the frame-producing application.
///
/// Every operation takes the same lock, so frames are appended in the order `record_frame`
/// calls acquire it. Clones share the same recorder.
#[derive(Clone)]
pub struct CaptureInterface(EventEmitter, Arc<Mutex<CaptureContext>>);

impl CaptureInterface {
	pub fn new(config: CaptureConfig) -> Self {
		return CaptureInterface(
			EventEmitter::new(config.event_capacity),
			Arc::new(Mutex::new(CaptureContext::new(config))),
		);
	}

	/// A producer that panicked mid-frame leaves nothing half-updated that would make the
	/// context unusable, so poisoning is ignored.
	pub(crate) fn lock(&self) -> MutexGuard<'_, CaptureContext> {
		return self.1.lock().unwrap_or_else(PoisonError::into_inner);
	}

	pub fn subscribe(&self) -> Receiver<CaptureEvent> {
		return self.0.subscribe();
	}

	/// Compiles a topology and installs it for subsequent recordings
	pub fn configure(&self, topology: &Topology) -> Result<(), CaptureError> {
		let mut ctx = self.lock();
		if ctx.is_recording() {
			return Err(CaptureError::AlreadyRecording);
		}

		let map = PatchMap::compile(topology)?;
		self.0.emit(CaptureEvent::Configured {
			universes: map.universe_count(),
			width: map.width(),
			height: map.height(),
			assigned_channels: map.assigned_channels(),
			conflicts: map.conflicts().len(),
		});
		ctx.packer = Some(FramePacker::new(map));

		return Ok(());
	}

	/// Creates a new capture file, writes its header and begins recording.
	///
	/// Returns the capture file's name. On failure the recorder stays idle.
	pub fn start(&self) -> Result<String, CaptureError> {
		let mut ctx = self.lock();
		if ctx.is_recording() {
			return Err(CaptureError::AlreadyRecording);
		}
		let map = ctx.packer.as_ref().ok_or(CaptureError::NotConfigured)?.map();

		let header = CaptureHeader::from_dimensions(map.width(), map.height());
		let file_name = capture_file_name(&chrono::Local::now(), &ctx.config.extension);
		let file = CaptureFile::create(&ctx.config.output_directory, file_name.clone(), header)
			.map_err(|source| CaptureError::Io {
				file_name: file_name.clone(),
				source,
			})?;

		let session = CaptureSession::new(file);
		log::info!("{} ({})", recording_message(&file_name), session.file.path().display());
		self.0.emit(CaptureEvent::RecordingStarted {
			session: session.id,
			file_name: file_name.clone(),
		});
		ctx.state = RecorderState::Recording(session);

		return Ok(file_name);
	}

	/// Ends the current recording, closing its file. Returns the capture file's name.
	pub fn stop(&self) -> Result<String, CaptureError> {
		let mut ctx = self.lock();
		let session = match mem::replace(&mut ctx.state, RecorderState::Idle) {
			RecorderState::Idle => return Err(CaptureError::NotRecording),
			RecorderState::Recording(session) => session,
		};

		let file_name = session.file.file_name().to_owned();
		log::info!(
			"{} ({} frames, {} failed writes)",
			recorded_message(&file_name),
			session.frames_recorded,
			session.failed_writes,
		);
		self.0.emit(CaptureEvent::RecordingStopped {
			session: session.id,
			file_name: file_name.clone(),
			frames_recorded: session.frames_recorded,
			failed_writes: session.failed_writes,
		});

		return Ok(file_name);
	}

	/// Whether a recording is in progress
	pub fn status(&self) -> bool {
		return self.lock().is_recording();
	}

	/// Packs a frame and appends it to the capture file.
	///
	/// Does nothing while idle. A frame too small for the grid is dropped, and a failed append
	/// is reported; neither ends the session.
	pub fn record_frame(&self, frame: &[Rgb]) -> Result<RecordOutcome, CaptureError> {
		let mut guard = self.lock();
		let ctx = &mut *guard;

		let session = match ctx.state {
			RecorderState::Idle => return Ok(RecordOutcome::Idle),
			RecorderState::Recording(ref mut session) => session,
		};
		let packer = ctx.packer.as_mut().ok_or(CaptureError::NotConfigured)?;

		let packed = match packer.pack(frame) {
			Ok(packed) => packed,
			Err(PackError::SizeMismatch { expected, received }) => {
				log::warn!(
					"Dropping frame with {} pixels, the configured grid needs {}",
					received,
					expected,
				);
				self.0.emit(CaptureEvent::FrameDropped {
					session: session.id,
					expected,
					received,
				});
				return Err(CaptureError::SizeMismatch { expected, received });
			}
		};

		if let Err(source) = session.file.append(packed) {
			session.failed_writes += 1;
			log::error!(
				"Could not append frame to {}: {}",
				session.file.path().display(),
				source,
			);
			self.0.emit(CaptureEvent::WriteFailed {
				session: session.id,
				error: source.to_string(),
			});
			return Err(CaptureError::Io {
				file_name: session.file.file_name().to_owned(),
				source,
			});
		}

		session.frames_recorded += 1;
		return Ok(RecordOutcome::Recorded {
			bytes: packed.len(),
		});
	}

	/// Copy of the installed patch map, if any
	pub fn patch_map(&self) -> Option<PatchMap> {
		return self.lock().packer.as_ref().map(|packer| packer.map().clone());
	}

	/// Size in bytes of every packed frame under the installed topology
	pub fn frame_len(&self) -> Option<usize> {
		return self
			.lock()
			.packer
			.as_ref()
			.map(|packer| packer.map().assigned_channels());
	}

	/// Path of the file currently being recorded to
	pub fn current_file(&self) -> Option<PathBuf> {
		return match self.lock().state {
			RecorderState::Recording(ref session) => Some(session.file.path().to_path_buf()),
			RecorderState::Idle => None,
		};
	}

	/// Number of frames appended during the current recording
	pub fn frames_recorded(&self) -> Option<u64> {
		return match self.lock().state {
			RecorderState::Recording(ref session) => Some(session.frames_recorded),
			RecorderState::Idle => None,
		};
	}
}

/// Status line shown while a capture is running
pub fn recording_message(file_name: &str) -> String {
	return format!("Recording to: {}", file_name);
}

/// Status line shown once a capture has ended
pub fn recorded_message(file_name: &str) -> String {
	return format!("Recorded to: {}", file_name);
}
