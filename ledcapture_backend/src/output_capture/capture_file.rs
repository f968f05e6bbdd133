//! On-disk capture format.
//!
//! ```text
//! offset 0:   u8 width  (mod 256)
//! offset 1:   u8 height (mod 256)
//! offset 2..: packed frames back to back, no delimiters
//! ```
//!
//! Frames carry no length or index, so a reader must know the per-frame size
//! (the patch map's assigned channel count) up front.

use std::{
	fs::{self, File, OpenOptions},
	io::{self, ErrorKind, Read, Write},
	path::{Path, PathBuf},
};

use chrono::{DateTime, TimeZone};
use thiserror::Error;

/// Size of the dimension header at the start of every capture file
pub const HEADER_LEN: usize = 2;

/// Timestamp pattern used for capture file names, e.g. `2015-01-28__17-04-09`
pub const FILE_NAME_FORMAT: &str = "%Y-%m-%d__%H-%M-%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
	pub width: u8,
	pub height: u8,
}

impl CaptureHeader {
	/// Builds a header from grid dimensions. Dimensions above 255 wrap.
	pub fn from_dimensions(width: usize, height: usize) -> Self {
		return CaptureHeader {
			width: width as u8,
			height: height as u8,
		};
	}

	pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
		return [self.width, self.height];
	}

	pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
		return CaptureHeader {
			width: bytes[0],
			height: bytes[1],
		};
	}
}

/// Formats the file name for a capture started at `timestamp`
pub fn capture_file_name<Tz: TimeZone>(timestamp: &DateTime<Tz>, extension: &str) -> String
where
	Tz::Offset: std::fmt::Display,
{
	return format!("{}.{}", timestamp.format(FILE_NAME_FORMAT), extension);
}

/// Byte destination behind a [`CaptureFile`].
///
/// Besides plain writes, a sink must be able to cut itself back to a given length so a
/// failed append can be rolled back to the last frame boundary.
pub trait CaptureSink: Write + Send + std::fmt::Debug {
	fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl CaptureSink for File {
	fn truncate(&mut self, len: u64) -> io::Result<()> {
		return self.set_len(len);
	}
}

/// An open, append-only capture file.
///
/// The file always ends on a frame boundary: bytes from an append that fails part way are
/// truncated away again.
#[derive(Debug)]
pub struct CaptureFile {
	path: PathBuf,
	file_name: String,
	sink: Box<dyn CaptureSink>,
	committed_len: u64,
}

impl CaptureFile {
	/// Creates `directory/file_name` and writes the dimension header.
	///
	/// Fails if the file already exists. If the header cannot be written, the new file is removed.
	pub fn create(directory: &Path, file_name: String, header: CaptureHeader) -> io::Result<Self> {
		let path = directory.join(&file_name);
		let mut handle = OpenOptions::new().append(true).create_new(true).open(&path)?;

		if let Err(err) = handle.write_all(&header.to_bytes()) {
			drop(handle);
			fs::remove_file(&path).ok();
			return Err(err);
		}

		return Ok(CaptureFile {
			path,
			file_name,
			sink: Box::new(handle),
			committed_len: HEADER_LEN as u64,
		});
	}

	pub fn path(&self) -> &Path {
		return &self.path;
	}

	pub fn file_name(&self) -> &str {
		return &self.file_name;
	}

	/// Length of the header plus every frame appended in full
	pub fn committed_len(&self) -> u64 {
		return self.committed_len;
	}

	/// Appends one packed frame.
	///
	/// On failure, any part of the frame that reached the sink is cut off before the error is
	/// returned.
	pub fn append(&mut self, packed: &[u8]) -> io::Result<()> {
		if let Err(err) = self.sink.write_all(packed) {
			if let Err(truncate_err) = self.sink.truncate(self.committed_len) {
				log::error!(
					"Could not roll {} back to {} bytes after a failed append: {}",
					self.path.display(),
					self.committed_len,
					truncate_err,
				);
			}
			return Err(err);
		}

		self.committed_len += packed.len() as u64;
		return Ok(());
	}

	/// Swaps the destination bytes are written to, keeping the committed length
	#[cfg(test)]
	pub(crate) fn replace_sink(&mut self, sink: Box<dyn CaptureSink>) {
		self.sink = sink;
	}
}

#[derive(Error, Debug)]
pub enum CaptureReadError {
	#[error("Capture file ends before its 2-byte header")]
	MissingHeader,
	#[error("Capture file ends in a partial frame: {received} of {expected} bytes")]
	TruncatedFrame { expected: usize, received: usize },
	#[error("I/O error while reading capture file:\n{0}")]
	Io(#[from] io::Error),
}

/// Reads frames back out of a capture file
#[derive(Debug)]
pub struct CaptureReader<R: Read> {
	reader: R,
	header: CaptureHeader,
	frame_len: usize,
}

impl CaptureReader<io::BufReader<File>> {
	pub fn open(path: impl AsRef<Path>, frame_len: usize) -> Result<Self, CaptureReadError> {
		let file = File::open(path)?;
		return CaptureReader::new(io::BufReader::new(file), frame_len);
	}
}

impl<R: Read> CaptureReader<R> {
	/// Reads the header from `reader`. `frame_len` is the size of one packed frame.
	pub fn new(mut reader: R, frame_len: usize) -> Result<Self, CaptureReadError> {
		let mut header = [0u8; HEADER_LEN];
		if read_up_to(&mut reader, &mut header)? < HEADER_LEN {
			return Err(CaptureReadError::MissingHeader);
		}

		return Ok(CaptureReader {
			reader,
			header: CaptureHeader::from_bytes(header),
			frame_len,
		});
	}

	pub fn header(&self) -> CaptureHeader {
		return self.header;
	}

	pub fn frame_len(&self) -> usize {
		return self.frame_len;
	}

	/// Reads the next frame, or `None` once the file ends cleanly on a frame boundary.
	///
	/// A zero-length frame size never yields frames.
	pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, CaptureReadError> {
		if self.frame_len == 0 {
			return Ok(None);
		}

		let mut frame = vec![0u8; self.frame_len];
		let received = read_up_to(&mut self.reader, &mut frame)?;
		if received == 0 {
			return Ok(None);
		}
		if received < self.frame_len {
			return Err(CaptureReadError::TruncatedFrame {
				expected: self.frame_len,
				received,
			});
		}
		return Ok(Some(frame));
	}

	/// Reads every remaining frame
	pub fn read_all(&mut self) -> Result<Vec<Vec<u8>>, CaptureReadError> {
		let mut frames = Vec::new();
		while let Some(frame) = self.next_frame()? {
			frames.push(frame);
		}
		return Ok(frames);
	}
}

/// Fills as much of `buf` as the reader allows, returning the number of bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match reader.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(read) => filled += read,
			Err(err) if err.kind() == ErrorKind::Interrupted => continue,
			Err(err) => return Err(err),
		}
	}
	return Ok(filled);
}
