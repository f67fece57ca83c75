//! Host identity exchange
//!
//! Each side sends its host name as an encrypted string. There is no
//! challenge/response: a peer that can produce a frame we can decrypt
//! holds the same pre-shared key, which is all the authentication the
//! protocol performs.

use sysinfo::System;
use tokio::io::{AsyncRead, AsyncWrite};

use super::error::ProtocolError;
use super::transport::Transport;
use super::ProtocolResult;

/// Name sent when the host name cannot be determined
pub const UNKNOWN_HOST: &str = "unknownHost";

/// This machine's host name
pub fn local_host_name() -> String {
	System::host_name().filter(|name| !name.is_empty()).unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

impl<R, W> Transport<R, W>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	/// Send this host's name
	pub async fn announce_identity(&mut self) -> ProtocolResult<()> {
		self.send_string(&local_host_name()).await
	}

	/// Read the peer's host name
	///
	/// Any failure to decrypt is reported as `ProtocolError::Decrypt`, which
	/// the session layer turns into an authentication error.
	pub async fn receive_identity(&mut self) -> ProtocolResult<String> {
		let name = self.recv_string().await?;
		if name.trim().is_empty() {
			return Err(ProtocolError::ProtocolViolation("peer sent an empty identity".to_string()));
		}
		Ok(name)
	}
}


// vim: ts=4
