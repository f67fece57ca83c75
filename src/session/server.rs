//! Server session: accept one client and serve its requests

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use super::{exchange_ignore_lists, identity_error, scan_tree, SessionOutcome};
use crate::config::Profile;
use crate::error::SyncError;
use crate::execute::{serve_requests, ServiceOutcome};
use crate::logging::*;
use crate::progress::ProgressMode;
use crate::protocol::{ControlCode, SessionCipher, TcpTransport, Transport};

/// Listen on the profile's port and serve exactly one session
pub async fn run_server(profile: &Profile, progress: ProgressMode) -> Result<SessionOutcome, SyncError> {
	let location = format!("0.0.0.0:{}", profile.server_port);
	let listener = TcpListener::bind(location.as_str())
		.await
		.map_err(|source| SyncError::ConnectionFailed { location, source })?;
	serve_one(listener, profile, progress).await
}

/// Accept a single connection from `listener` and run the session on it
pub async fn serve_one(
	listener: TcpListener,
	profile: &Profile,
	progress: ProgressMode,
) -> Result<SessionOutcome, SyncError> {
	if let Ok(addr) = listener.local_addr() {
		info!("Waiting for a client on {}...", addr);
	}
	let (stream, peer) = listener.accept().await.map_err(|source| SyncError::ConnectionFailed {
		location: "listener".to_string(),
		source,
	})?;
	drop(listener);
	info!("Client connected from {}", peer);

	let transport =
		TcpTransport::over_tcp(stream, SessionCipher::new(&profile.key)).with_progress(progress);
	server_session(transport, profile, progress).await
}

/// Serve a session over an already-accepted transport
pub async fn server_session<R, W>(
	mut transport: Transport<R, W>,
	profile: &Profile,
	progress: ProgressMode,
) -> Result<SessionOutcome, SyncError>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	info!("Verifying client identity...");
	let client_name = match transport.receive_identity().await {
		Ok(name) => name,
		Err(e) => {
			error!("Client authentication failed");
			let _ = transport.send_code(ControlCode::Error).await;
			let _ = transport.shutdown().await;
			return Err(identity_error(e));
		}
	};
	info!("Client authenticated as {}", client_name);
	transport.send_code(ControlCode::Done).await?;
	transport.announce_identity().await?;

	match transport.recv_code().await? {
		ControlCode::Done => {}
		other => {
			error!("Client aborted the handshake ({})", other);
			let _ = transport.shutdown().await;
			return Err(SyncError::AuthenticationFailed {
				message: format!("client aborted the handshake with {}", other),
			});
		}
	}

	let ignore_list = exchange_ignore_lists(&mut transport, &profile.ignore_list).await?;
	let local = scan_tree(&profile.sync_dir, &ignore_list, progress).await?;
	transport.send_structure(&local.map).await?;

	info!("Waiting for client requests...");
	let (outcome, report) = serve_requests(&mut transport, &profile.sync_dir).await?;
	let _ = transport.shutdown().await;

	match outcome {
		ServiceOutcome::Completed => {
			info!(
				"Done: {} directories created, {} files transferred ({} bytes), {} paths deleted",
				report.dirs_created,
				report.files_transferred,
				report.bytes_transferred,
				report.paths_deleted
			);
			Ok(SessionOutcome::Completed(report))
		}
		ServiceOutcome::Cancelled => Ok(SessionOutcome::Cancelled),
	}
}

// vim: ts=4
