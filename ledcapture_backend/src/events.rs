use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};
use uuid::Uuid;

use crate::output_capture::interface::{recorded_message, recording_message};

/// Describes something that happened inside the capture recorder, for consumption by a
/// status display or other collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CaptureEvent {
	/// A new topology was compiled and installed
	Configured {
		universes: usize,
		width: usize,
		height: usize,
		assigned_channels: usize,
		conflicts: usize,
	},
	RecordingStarted {
		session: Uuid,
		file_name: String,
	},
	RecordingStopped {
		session: Uuid,
		file_name: String,
		frames_recorded: u64,
		failed_writes: u64,
	},
	/// A frame arrived with fewer pixels than the configured grid and was skipped
	FrameDropped {
		session: Uuid,
		expected: usize,
		received: usize,
	},
	/// Appending a frame to the capture file failed. The session keeps recording.
	WriteFailed {
		session: Uuid,
		error: String,
	},
}

impl CaptureEvent {
	/// Status line a display shows in response to this event, if any
	pub fn status_message(&self) -> Option<String> {
		return match self {
			CaptureEvent::RecordingStarted { file_name, .. } => Some(recording_message(file_name)),
			CaptureEvent::RecordingStopped { file_name, .. } => Some(recorded_message(file_name)),
			_ => None,
		};
	}
}

/// Broadcasts [`CaptureEvent`]s to any number of subscribers.
///
/// Subscribers that fall behind by more than the channel capacity miss the oldest events.
#[derive(Clone, Debug)]
pub struct EventEmitter(Sender<CaptureEvent>);

impl EventEmitter {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		return EventEmitter(sender);
	}

	pub fn subscribe(&self) -> Receiver<CaptureEvent> {
		return self.0.subscribe();
	}

	/// Sends an event to every current subscriber. Having no subscribers is fine.
	pub fn emit(&self, event: CaptureEvent) {
		self.0.send(event).ok();
	}

	pub fn subscriber_count(&self) -> usize {
		return self.0.receiver_count();
	}
}
