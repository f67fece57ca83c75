//! Protocol error types
//!
//! Every failure on the wire maps to one of these variants. Decryption
//! failures are kept apart from plain I/O so the session layer can report
//! them as authentication problems.

use std::fmt;
use std::io;

/// Protocol error type
#[derive(Debug)]
pub enum ProtocolError {
	/// I/O error on the underlying stream or a local file
	Io(io::Error),
	/// Frame could not be decrypted (wrong key or corrupted bytes)
	Decrypt(String),
	/// Frame could not be encrypted
	Encrypt(String),
	/// Structured payload could not be (de)serialized
	Serialization(String),
	/// Peer sent text that is not valid UTF-8
	Utf8(String),
	/// Control code outside the known set
	UnknownCode(i32),
	/// Peer announced a frame length that cannot be valid
	InvalidLength(i32),
	/// Peer could not provide the requested file
	RemoteFileUnavailable(String),
	/// Protocol violation (unexpected format or state)
	ProtocolViolation(String),
}

impl ProtocolError {
	/// True when the failure came from the cipher rejecting a frame
	pub fn is_decrypt_failure(&self) -> bool {
		matches!(self, ProtocolError::Decrypt(_))
	}
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::Io(e) => write!(f, "I/O error: {}", e),
			ProtocolError::Decrypt(msg) => write!(f, "Decryption failed: {}", msg),
			ProtocolError::Encrypt(msg) => write!(f, "Encryption failed: {}", msg),
			ProtocolError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
			ProtocolError::Utf8(msg) => write!(f, "Invalid UTF-8 in frame: {}", msg),
			ProtocolError::UnknownCode(code) => write!(f, "Unknown control code {}", code),
			ProtocolError::InvalidLength(len) => write!(f, "Invalid frame length {}", len),
			ProtocolError::RemoteFileUnavailable(path) => {
				write!(f, "Peer could not provide file {}", path)
			}
			ProtocolError::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
		}
	}
}

impl std::error::Error for ProtocolError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ProtocolError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ProtocolError {
	fn from(e: io::Error) -> Self {
		ProtocolError::Io(e)
	}
}

impl From<serde_json::Error> for ProtocolError {
	fn from(e: serde_json::Error) -> Self {
		ProtocolError::Serialization(e.to_string())
	}
}

impl From<std::string::FromUtf8Error> for ProtocolError {
	fn from(e: std::string::FromUtf8Error) -> Self {
		ProtocolError::Utf8(e.to_string())
	}
}

impl From<crate::validation::ValidationError> for ProtocolError {
	fn from(e: crate::validation::ValidationError) -> Self {
		ProtocolError::ProtocolViolation(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decrypt_failure_detection() {
		assert!(ProtocolError::Decrypt("bad tag".to_string()).is_decrypt_failure());
		assert!(!ProtocolError::UnknownCode(7).is_decrypt_failure());
	}

	#[test]
	fn test_display_unknown_code() {
		let err = ProtocolError::UnknownCode(99);
		assert_eq!(err.to_string(), "Unknown control code 99");
	}
}

// vim: ts=4
