use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::{
	capture_types::{CaptureError, RecordOutcome, Rgb},
	interface::CaptureInterface,
};

/// Tally of what happened to every frame a pump received
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePumpReport {
	pub recorded: u64,
	pub ignored: u64,
	pub dropped: u64,
	pub failed: u64,
}

/// Spawns a single writer that records frames from `receiver` in the order they were sent.
///
/// The pump runs on tokio's blocking pool, since packing and appending block. It ends once every
/// sender has been dropped and the queue is drained.
pub fn spawn_frame_pump(
	interface: CaptureInterface,
	mut receiver: Receiver<Vec<Rgb>>,
) -> JoinHandle<FramePumpReport> {
	return tokio::task::spawn_blocking(move || {
		let mut report = FramePumpReport::default();

		while let Some(frame) = receiver.blocking_recv() {
			match interface.record_frame(&frame) {
				Ok(RecordOutcome::Recorded { .. }) => report.recorded += 1,
				Ok(RecordOutcome::Idle) => report.ignored += 1,
				Err(CaptureError::SizeMismatch { .. }) => report.dropped += 1,
				Err(err) if err.is_recoverable() => report.failed += 1,
				Err(err) => {
					log::error!("Frame pump could not record a frame: {}", err);
					report.failed += 1;
				}
			}
		}

		log::debug!("Frame pump finished: {:?}", report);
		return report;
	});
}
