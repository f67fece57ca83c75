//! Control codes and stream sentinels
//!
//! Control codes travel as bare big-endian integers between frames. Frame
//! lengths are always positive, so the stream sentinels are negative and
//! can never be mistaken for either.

use std::convert::TryFrom;
use std::fmt;

use super::error::ProtocolError;

/// Terminates a file stream after the last chunk
pub const STREAM_END: i32 = -1;

/// Sent instead of any chunk when the sender cannot open the file
pub const STREAM_ABORT: i32 = -2;

/// Control/status codes exchanged between client and server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
	/// Step completed / session finished
	Done,
	/// Step failed on the sending side
	Error,
	/// Recursively delete a path on the passive peer
	Delete,
	/// Upload a file to the passive peer
	Put,
	/// Download a file from the passive peer
	Get,
	/// Create a directory on the passive peer
	CreateDir,
	/// Abort the session before any change is applied
	Cancel,
}

impl ControlCode {
	pub fn code(self) -> i32 {
		match self {
			ControlCode::Done => 0,
			ControlCode::Error => 1,
			ControlCode::Delete => 2,
			ControlCode::Put => 5,
			ControlCode::Get => 10,
			ControlCode::CreateDir => 21,
			ControlCode::Cancel => 42,
		}
	}
}

impl TryFrom<i32> for ControlCode {
	type Error = ProtocolError;

	fn try_from(code: i32) -> Result<Self, ProtocolError> {
		match code {
			0 => Ok(ControlCode::Done),
			1 => Ok(ControlCode::Error),
			2 => Ok(ControlCode::Delete),
			5 => Ok(ControlCode::Put),
			10 => Ok(ControlCode::Get),
			21 => Ok(ControlCode::CreateDir),
			42 => Ok(ControlCode::Cancel),
			other => Err(ProtocolError::UnknownCode(other)),
		}
	}
}

impl fmt::Display for ControlCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}({})", self, self.code())
	}
}


// vim: ts=4
