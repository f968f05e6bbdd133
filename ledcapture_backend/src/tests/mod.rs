mod recorder;

use std::{
	fs::{self, File, OpenOptions},
	io::{self, Write},
	path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{
	output_capture::{
		capture_file::CaptureSink,
		capture_types::Rgb,
		config::CaptureConfig,
		interface::CaptureInterface,
		state::RecorderState,
	},
	patcher::{AssignmentGrid, PixelAssignment, Topology, UniverseDefinition},
};

pub fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

/// A scratch directory that is deleted when dropped
pub struct TempDir(PathBuf);
impl TempDir {
	pub fn new() -> Self {
		let path = std::env::temp_dir().join(format!("ledcapture-test-{}", Uuid::new_v4()));
		fs::create_dir_all(&path).expect("Couldn't create scratch directory");
		return TempDir(path);
	}

	pub fn path(&self) -> &Path {
		return &self.0;
	}

	pub fn config(&self) -> CaptureConfig {
		return CaptureConfig::new(&self.0);
	}
}
impl Drop for TempDir {
	fn drop(&mut self) {
		fs::remove_dir_all(&self.0).ok();
	}
}

/// Writes through to an existing capture file until `remaining` bytes are used up, then fails
/// every write the way a full disk does
#[derive(Debug)]
pub struct LimitedSink {
	file: File,
	remaining: usize,
}
impl LimitedSink {
	pub fn open(path: &Path, remaining: usize) -> Self {
		let file = OpenOptions::new()
			.append(true)
			.open(path)
			.expect("Couldn't reopen capture file");
		return LimitedSink { file, remaining };
	}
}
impl Write for LimitedSink {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		if self.remaining == 0 {
			return Err(io::Error::new(io::ErrorKind::Other, "No space left on device"));
		}
		let written = self.file.write(&buf[..buf.len().min(self.remaining)])?;
		self.remaining -= written;
		return Ok(written);
	}

	fn flush(&mut self) -> io::Result<()> {
		return self.file.flush();
	}
}
impl CaptureSink for LimitedSink {
	fn truncate(&mut self, len: u64) -> io::Result<()> {
		return self.file.set_len(len);
	}
}

/// Limits the running recording to `remaining` more bytes
pub fn limit_recording(recorder: &CaptureInterface, remaining: usize) {
	let mut ctx = recorder.lock();
	match ctx.state {
		RecorderState::Recording(ref mut session) => {
			let sink = LimitedSink::open(session.file.path(), remaining);
			session.file.replace_sink(Box::new(sink));
		}
		RecorderState::Idle => panic!("Recorder is not recording"),
	}
}

/// Two universes: universe 0 (6 channels) carries a 2x1 grid on channels 0-5,
/// universe 1 (2 channels) is left unpatched.
pub fn two_pixel_topology() -> Topology {
	return Topology::new(
		vec![UniverseDefinition::new(6), UniverseDefinition::new(2)],
		AssignmentGrid::from_columns(vec![
			vec![PixelAssignment::consecutive(0, 0).unwrap()],
			vec![PixelAssignment::consecutive(0, 3).unwrap()],
		])
		.expect("Grid should be rectangular"),
	);
}

pub fn two_pixel_frame() -> Vec<Rgb> {
	return vec![Rgb::new(10, 20, 30), Rgb::new(40, 50, 60)];
}

/// Every pixel of a `width` x `height` grid wired to consecutive channels of a single universe,
/// in row-major order
pub fn dense_topology(width: usize, height: usize) -> Topology {
	let columns = (0..width)
		.map(|x| {
			(0..height)
				.map(|y| PixelAssignment::consecutive(0, ((y * width + x) * 3) as u16).unwrap())
				.collect()
		})
		.collect();
	return Topology::new(
		vec![UniverseDefinition::new((width * height * 3) as u16)],
		AssignmentGrid::from_columns(columns).expect("Grid should be rectangular"),
	);
}
