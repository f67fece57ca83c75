//! Encrypted framed transport
//!
//! Wire format (all integers are 4-byte big-endian two's complement):
//!
//! ```text
//! RawInt:  | value 4B |
//! Frame:   | len 4B | sealed payload (len bytes) |
//! File:    Frame* then RawInt(STREAM_END)   or   RawInt(STREAM_ABORT)
//! ```
//!
//! Control codes are sent as bare RawInts. Frame lengths are always at
//! least the cipher overhead, so they never collide with the negative
//! stream sentinels.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs as afs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::cipher::{SessionCipher, SEAL_OVERHEAD};
use super::codes::{ControlCode, STREAM_ABORT, STREAM_END};
use super::error::ProtocolError;
use super::{ProtocolResult, CHUNK_SIZE, MAX_FRAME_LEN, PART_SUFFIX};
use crate::logging::*;
use crate::progress::{ByteProgress, ProgressMode};

/// Transport over a split TCP connection
pub type TcpTransport = Transport<BufReader<OwnedReadHalf>, BufWriter<OwnedWriteHalf>>;

/// Outcome of serving a file to the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSent {
	/// Stream completed with this many plaintext bytes
	Sent(u64),
	/// File could not be opened; the peer was told with `STREAM_ABORT`
	Unavailable,
}

pub struct Transport<R, W> {
	reader: R,
	writer: W,
	cipher: SessionCipher,
	progress: ProgressMode,
}

impl TcpTransport {
	/// Wrap a connected socket
	pub fn over_tcp(stream: TcpStream, cipher: SessionCipher) -> Self {
		let (read_half, write_half) = stream.into_split();
		Transport::new(BufReader::new(read_half), BufWriter::new(write_half), cipher)
	}
}

impl<R, W> Transport<R, W>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	pub fn new(reader: R, writer: W, cipher: SessionCipher) -> Self {
		Self { reader, writer, cipher, progress: ProgressMode::Hidden }
	}

	pub fn with_progress(mut self, progress: ProgressMode) -> Self {
		self.progress = progress;
		self
	}

	// === RawInt ===

	pub async fn send_int(&mut self, n: i32) -> ProtocolResult<()> {
		self.writer.write_all(&n.to_be_bytes()).await?;
		self.writer.flush().await?;
		Ok(())
	}

	pub async fn recv_int(&mut self) -> ProtocolResult<i32> {
		let mut buf = [0u8; 4];
		self.reader.read_exact(&mut buf).await?;
		Ok(i32::from_be_bytes(buf))
	}

	pub async fn send_code(&mut self, code: ControlCode) -> ProtocolResult<()> {
		debug!("-> {}", code);
		self.send_int(code.code()).await
	}

	pub async fn recv_code(&mut self) -> ProtocolResult<ControlCode> {
		let raw = self.recv_int().await?;
		let code = ControlCode::try_from(raw)?;
		debug!("<- {}", code);
		Ok(code)
	}

	// === Frame ===

	pub async fn send_frame(&mut self, plaintext: &[u8]) -> ProtocolResult<()> {
		let sealed = self.cipher.seal(plaintext)?;
		self.write_sealed(&sealed).await?;
		self.writer.flush().await?;
		Ok(())
	}

	pub async fn recv_frame(&mut self) -> ProtocolResult<Vec<u8>> {
		let len = self.recv_int().await?;
		self.read_sealed(len).await
	}

	async fn write_sealed(&mut self, sealed: &[u8]) -> ProtocolResult<()> {
		let len = i32::try_from(sealed.len()).map_err(|_| {
			ProtocolError::ProtocolViolation(format!(
				"frame of {} bytes exceeds the length field",
				sealed.len()
			))
		})?;
		self.writer.write_all(&len.to_be_bytes()).await?;
		self.writer.write_all(sealed).await?;
		Ok(())
	}

	async fn read_sealed(&mut self, len: i32) -> ProtocolResult<Vec<u8>> {
		if len < SEAL_OVERHEAD as i32 || len as usize > MAX_FRAME_LEN {
			return Err(ProtocolError::InvalidLength(len));
		}
		let mut sealed = vec![0u8; len as usize];
		self.reader.read_exact(&mut sealed).await?;
		self.cipher.open(&sealed)
	}

	// === EncryptedString / EncryptedStructure ===

	pub async fn send_string(&mut self, s: &str) -> ProtocolResult<()> {
		self.send_frame(s.as_bytes()).await
	}

	pub async fn recv_string(&mut self) -> ProtocolResult<String> {
		let plain = self.recv_frame().await?;
		Ok(String::from_utf8(plain)?)
	}

	pub async fn send_structure<T: Serialize>(&mut self, value: &T) -> ProtocolResult<()> {
		let json = serde_json::to_vec(value)?;
		self.send_frame(&json).await
	}

	pub async fn recv_structure<T: DeserializeOwned>(&mut self) -> ProtocolResult<T> {
		let plain = self.recv_frame().await?;
		Ok(serde_json::from_slice(&plain)?)
	}

	// === FileStream ===

	/// Stream a local file as encrypted chunks followed by `STREAM_END`
	pub async fn send_file(&mut self, path: &Path) -> ProtocolResult<FileSent> {
		let mut file = match afs::File::open(path).await {
			Ok(f) => f,
			Err(e) => {
				warn!("Cannot open {} for sending: {}", path.display(), e);
				self.send_int(STREAM_ABORT).await?;
				return Ok(FileSent::Unavailable);
			}
		};
		let total = file.metadata().await.ok().map(|m| m.len());
		let mut bar = ByteProgress::new(self.progress, "Sending", total);
		let mut buf = vec![0u8; CHUNK_SIZE];

		loop {
			let n = file.read(&mut buf).await?;
			if n == 0 {
				break;
			}
			let sealed = self.cipher.seal(&buf[..n])?;
			self.write_sealed(&sealed).await?;
			self.writer.flush().await?;
			bar.advance(n as u64);
		}
		self.send_int(STREAM_END).await?;

		let sent = bar.done();
		bar.finish();
		Ok(FileSent::Sent(sent))
	}

	/// Receive a file stream into `path`, creating parent directories
	///
	/// Bytes land in a part file next to `path` that is renamed over it once
	/// `STREAM_END` arrives, so an existing file is only replaced by a
	/// complete copy. An aborted stream leaves the local filesystem untouched.
	pub async fn recv_file(&mut self, path: &Path) -> ProtocolResult<u64> {
		let len = self.recv_int().await?;
		if len == STREAM_ABORT {
			return Err(ProtocolError::RemoteFileUnavailable(path.display().to_string()));
		}

		if let Some(parent) = path.parent() {
			afs::create_dir_all(parent).await?;
		}
		let part = part_path(path);
		let result = self.recv_into_part(len, &part).await;
		match result {
			Ok(received) => {
				afs::rename(&part, path).await?;
				Ok(received)
			}
			Err(e) => {
				let _ = afs::remove_file(&part).await;
				Err(e)
			}
		}
	}

	async fn recv_into_part(&mut self, first_len: i32, part: &Path) -> ProtocolResult<u64> {
		let mut file = afs::File::create(part).await?;
		let mut bar = ByteProgress::new(self.progress, "Receiving", None);

		let mut len = first_len;
		while len != STREAM_END {
			let chunk = self.read_sealed(len).await?;
			file.write_all(&chunk).await?;
			bar.advance(chunk.len() as u64);
			len = self.recv_int().await?;
		}
		file.flush().await?;

		let received = bar.done();
		bar.finish();
		Ok(received)
	}

	/// Flush and half-close the write side
	pub async fn shutdown(&mut self) -> ProtocolResult<()> {
		self.writer.flush().await?;
		self.writer.shutdown().await?;
		Ok(())
	}
}

/// Sibling of `path` that receives bytes before the final rename
fn part_path(path: &Path) -> PathBuf {
	let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
	path.with_file_name(format!(".{}{}", name, PART_SUFFIX))
}


// vim: ts=4
