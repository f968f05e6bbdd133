use std::fs;

use crate::{
	events::CaptureEvent,
	output_capture::{
		capture_file::CaptureReader,
		capture_types::{CaptureError, RecordOutcome, Rgb},
		config::CaptureConfig,
		interface::{recorded_message, recording_message, CaptureInterface},
		packer::unpack_frame,
	},
	patcher::ConfigurationError,
};

use super::{
	dense_topology, init_logging, limit_recording, two_pixel_frame, two_pixel_topology, TempDir,
};

#[test]
fn records_two_pixel_scenario() {
	init_logging();
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&two_pixel_topology()).unwrap();
	assert!(!recorder.status());

	let file_name = recorder.start().unwrap();
	assert!(file_name.ends_with(".led"));
	assert!(recorder.status());
	assert_eq!(recorder.current_file(), Some(dir.path().join(&file_name)));

	assert_eq!(
		recorder.record_frame(&two_pixel_frame()).unwrap(),
		RecordOutcome::Recorded { bytes: 6 }
	);
	assert_eq!(recorder.frames_recorded(), Some(1));

	assert_eq!(recorder.stop().unwrap(), file_name);
	assert!(!recorder.status());
	assert_eq!(recorder.current_file(), None);

	assert_eq!(
		fs::read(dir.path().join(&file_name)).unwrap(),
		vec![2, 1, 10, 20, 30, 40, 50, 60]
	);
}

#[test]
fn status_messages_name_the_file() {
	assert_eq!(recording_message("a.led"), "Recording to: a.led");
	assert_eq!(recorded_message("a.led"), "Recorded to: a.led");
}

#[test]
fn idle_recorder_ignores_frames() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());

	// Before configuration
	assert_eq!(
		recorder.record_frame(&two_pixel_frame()).unwrap(),
		RecordOutcome::Idle
	);

	recorder.configure(&two_pixel_topology()).unwrap();
	assert_eq!(
		recorder.record_frame(&two_pixel_frame()).unwrap(),
		RecordOutcome::Idle
	);
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn start_requires_configuration() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());

	assert!(matches!(recorder.start(), Err(CaptureError::NotConfigured)));
	assert!(!recorder.status());
}

#[test]
fn failed_start_stays_idle() {
	init_logging();
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(CaptureConfig::new(dir.path().join("missing")));
	recorder.configure(&two_pixel_topology()).unwrap();

	match recorder.start() {
		Err(CaptureError::Io { file_name, .. }) => assert!(file_name.ends_with(".led")),
		other => panic!("Expected an I/O error, got {:?}", other),
	}
	assert!(!recorder.status());
	assert_eq!(
		recorder.record_frame(&two_pixel_frame()).unwrap(),
		RecordOutcome::Idle
	);
}

#[test]
fn stop_requires_a_recording() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	assert!(matches!(recorder.stop(), Err(CaptureError::NotRecording)));
}

#[test]
fn rejects_overlapping_sessions_and_reconfiguration() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&two_pixel_topology()).unwrap();
	recorder.start().unwrap();

	assert!(matches!(recorder.start(), Err(CaptureError::AlreadyRecording)));
	assert!(matches!(
		recorder.configure(&dense_topology(4, 4)),
		Err(CaptureError::AlreadyRecording)
	));
	assert_eq!(recorder.frame_len(), Some(6));

	recorder.stop().unwrap();
	recorder.configure(&dense_topology(4, 4)).unwrap();
	assert_eq!(recorder.frame_len(), Some(48));
}

#[test]
fn invalid_topology_keeps_previous_configuration() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&two_pixel_topology()).unwrap();

	let mut broken = two_pixel_topology();
	broken.universes.clear();
	assert!(matches!(
		recorder.configure(&broken),
		Err(CaptureError::Configuration(ConfigurationError::NoUniverses))
	));
	assert_eq!(recorder.frame_len(), Some(6));
}

#[test]
fn short_frames_are_dropped_without_ending_the_session() {
	init_logging();
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&dense_topology(4, 4)).unwrap();
	let file_name = recorder.start().unwrap();

	let result = recorder.record_frame(&[Rgb::new(1, 1, 1); 3]);
	assert!(matches!(
		result,
		Err(CaptureError::SizeMismatch { expected: 16, received: 3 })
	));
	assert!(result.unwrap_err().is_recoverable());
	assert!(recorder.status());
	assert_eq!(recorder.frames_recorded(), Some(0));
	assert_eq!(fs::read(dir.path().join(&file_name)).unwrap(), vec![4, 4]);

	recorder.stop().unwrap();
}

#[test]
fn frames_are_appended_in_call_order() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&dense_topology(3, 2)).unwrap();
	let map = recorder.patch_map().unwrap();
	recorder.start().unwrap();
	let path = recorder.current_file().unwrap();

	let frames: Vec<Vec<Rgb>> = (0..5u8)
		.map(|n| (0..6u8).map(|i| Rgb::new(n, i, n.wrapping_add(i))).collect())
		.collect();
	for frame in frames.iter() {
		recorder.record_frame(frame).unwrap();
	}
	recorder.stop().unwrap();

	let mut reader = CaptureReader::open(&path, recorder.frame_len().unwrap()).unwrap();
	assert_eq!(reader.header().width, 3);
	assert_eq!(reader.header().height, 2);

	let recorded = reader.read_all().unwrap();
	assert_eq!(recorded.len(), frames.len());
	for (packed, frame) in recorded.iter().zip(frames.iter()) {
		let pixels = unpack_frame(packed, &map).unwrap();
		let expected: Vec<Option<u8>> = frame
			.iter()
			.flat_map(|color| color.components())
			.map(Some)
			.collect();
		assert_eq!(pixels, expected);
	}
}

#[test]
fn header_wraps_wide_grids() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	recorder.configure(&dense_topology(257, 1)).unwrap();
	let file_name = recorder.start().unwrap();
	recorder.stop().unwrap();

	assert_eq!(fs::read(dir.path().join(file_name)).unwrap(), vec![1, 1]);
}

#[test]
fn clones_share_the_same_recorder() {
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	let producer = recorder.clone();
	recorder.configure(&two_pixel_topology()).unwrap();
	recorder.start().unwrap();

	assert!(producer.status());
	producer.record_frame(&two_pixel_frame()).unwrap();
	assert_eq!(recorder.frames_recorded(), Some(1));
	recorder.stop().unwrap();
}

#[test]
fn failed_appends_keep_recording_on_a_frame_boundary() {
	init_logging();
	let dir = TempDir::new();
	let recorder = CaptureInterface::new(dir.config());
	let mut events = recorder.subscribe();
	recorder.configure(&two_pixel_topology()).unwrap();
	let file_name = recorder.start().unwrap();
	let path = recorder.current_file().unwrap();

	// Room for one frame and two bytes of the next
	limit_recording(&recorder, 8);
	assert_eq!(
		recorder.record_frame(&two_pixel_frame()).unwrap(),
		RecordOutcome::Recorded { bytes: 6 }
	);

	for _ in 0..2 {
		match recorder.record_frame(&two_pixel_frame()) {
			Err(err @ CaptureError::Io { .. }) => assert!(err.is_recoverable()),
			other => panic!("Expected an I/O error, got {:?}", other),
		}
		assert!(recorder.status());
		assert_eq!(fs::read(&path).unwrap(), vec![2, 1, 10, 20, 30, 40, 50, 60]);
	}
	assert_eq!(recorder.frames_recorded(), Some(1));
	recorder.stop().unwrap();

	let mut reader = CaptureReader::open(&path, 6).unwrap();
	assert_eq!(reader.read_all().unwrap(), vec![vec![10, 20, 30, 40, 50, 60]]);

	let received: Vec<CaptureEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
	assert_eq!(received.len(), 5);
	let session = match received[1] {
		CaptureEvent::RecordingStarted { session, .. } => session,
		ref other => panic!("Expected RecordingStarted, got {:?}", other),
	};
	let write_failed = CaptureEvent::WriteFailed {
		session,
		error: String::from("No space left on device"),
	};
	assert_eq!(received[2], write_failed);
	assert_eq!(received[3], write_failed);
	assert_eq!(
		received[4],
		CaptureEvent::RecordingStopped {
			session,
			file_name,
			frames_recorded: 1,
			failed_writes: 2,
		}
	);
}
