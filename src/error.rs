//! Error types for filesync operations

use std::error::Error;
use std::fmt;
use std::io;

use crate::protocol::ProtocolError;
use crate::validation::ValidationError;

/// Main error type for a filesync run
#[derive(Debug)]
pub enum SyncError {
	/// Command line did not name a mode and a profile
	MissingArguments,

	/// Mode token was neither `server` nor `client`
	InvalidMode { mode: String },

	/// Operator answered the direction prompt with something other than 1 or 2
	InvalidSelection,

	/// Profile id not found; a template was written in its place
	UnknownProfile { id: String },

	/// Profile exists but failed validation
	InvalidProfile { id: String, source: ValidationError },

	/// Could not read or write the profile file
	InvalidConfig { message: String },

	/// Failed to connect or to accept a connection
	ConnectionFailed { location: String, source: io::Error },

	/// Peer does not hold the same key, or rejected ours
	AuthenticationFailed { message: String },

	/// Protocol failure after authentication
	Protocol(ProtocolError),

	/// I/O error outside the transport
	Io(io::Error),
}

impl SyncError {
	/// Process exit code for this error
	pub fn exit_code(&self) -> i32 {
		match self {
			SyncError::MissingArguments => -1,
			SyncError::InvalidMode { .. } | SyncError::InvalidSelection => -2,
			SyncError::UnknownProfile { .. } => -3,
			SyncError::InvalidProfile { .. } | SyncError::InvalidConfig { .. } => -4,
			SyncError::ConnectionFailed { .. } => -5,
			SyncError::AuthenticationFailed { .. } => -6,
			SyncError::Protocol(_) | SyncError::Io(_) => -7,
		}
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::MissingArguments => {
				write!(f, "Usage: filesync <server|client> <profileId>")
			}
			SyncError::InvalidMode { mode } => {
				write!(f, "Invalid mode '{}': expected 'server' or 'client'", mode)
			}
			SyncError::InvalidSelection => write!(f, "Invalid selection: expected 1 or 2"),
			SyncError::UnknownProfile { id } => {
				write!(f, "Profile '{}' not found; a template was added to the config file", id)
			}
			SyncError::InvalidProfile { id, source } => {
				write!(f, "Profile '{}' is invalid: {}", id, source)
			}
			SyncError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::ConnectionFailed { location, source } => {
				write!(f, "Failed to connect to {}: {}", location, source)
			}
			SyncError::AuthenticationFailed { message } => {
				write!(f, "Authentication failed: {}", message)
			}
			SyncError::Protocol(e) => write!(f, "Protocol error: {}", e),
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::InvalidProfile { source, .. } => Some(source),
			SyncError::ConnectionFailed { source, .. } => Some(source),
			SyncError::Protocol(e) => Some(e),
			SyncError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<ProtocolError> for SyncError {
	fn from(e: ProtocolError) -> Self {
		SyncError::Protocol(e)
	}
}


// vim: ts=4
