//! Client session: connect, authenticate, plan, confirm, execute

use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use super::{exchange_ignore_lists, identity_error, scan_tree, Operator, SessionOutcome};
use crate::config::Profile;
use crate::error::SyncError;
use crate::execute::{apply_pull, apply_push};
use crate::logging::*;
use crate::plan::{plan_for, Direction};
use crate::progress::ProgressMode;
use crate::protocol::{ControlCode, SessionCipher, TcpTransport, Transport};
use crate::types::FingerprintMap;

/// Connect to the profile's server and run one session
pub async fn run_client<O: Operator>(
	profile: &Profile,
	operator: &mut O,
	progress: ProgressMode,
) -> Result<SessionOutcome, SyncError> {
	let location = format!("{}:{}", profile.server_host, profile.server_port);
	info!("Connecting to {}...", location);

	let connect = TcpStream::connect(location.as_str());
	let stream = match tokio::time::timeout(Duration::from_millis(profile.connect_timeout_ms), connect)
		.await
	{
		Ok(Ok(stream)) => stream,
		Ok(Err(source)) => return Err(SyncError::ConnectionFailed { location, source }),
		Err(_) => {
			let source = io::Error::new(
				io::ErrorKind::TimedOut,
				format!("no answer within {} ms", profile.connect_timeout_ms),
			);
			return Err(SyncError::ConnectionFailed { location, source });
		}
	};
	let _ = stream.set_nodelay(true);
	info!("Connected");

	let transport =
		TcpTransport::over_tcp(stream, SessionCipher::new(&profile.key)).with_progress(progress);
	client_session(transport, profile, operator, progress).await
}

/// Drive a session over an already-connected transport
pub async fn client_session<R, W, O>(
	mut transport: Transport<R, W>,
	profile: &Profile,
	operator: &mut O,
	progress: ProgressMode,
) -> Result<SessionOutcome, SyncError>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
	O: Operator,
{
	info!("Authenticating...");
	transport.announce_identity().await?;
	match transport.recv_code().await? {
		ControlCode::Done => {}
		other => {
			return Err(SyncError::AuthenticationFailed {
				message: format!("server rejected our identity ({})", other),
			});
		}
	}
	let server_name = transport.receive_identity().await.map_err(identity_error)?;
	info!("Authenticated, server is {}", server_name);

	let Some(direction) = operator.choose_direction() else {
		error!("No valid sync direction chosen");
		transport.send_code(ControlCode::Error).await?;
		let _ = transport.shutdown().await;
		return Err(SyncError::InvalidSelection);
	};
	transport.send_code(ControlCode::Done).await?;

	let ignore_list = exchange_ignore_lists(&mut transport, &profile.ignore_list).await?;
	let local = scan_tree(&profile.sync_dir, &ignore_list, progress).await?;

	info!("Waiting for the server file list...");
	let remote: FingerprintMap = transport.recv_structure().await?;
	debug!("Received {} remote entries", remote.len());

	let plan = plan_for(direction, &local.map, &remote, local.ignored);
	info!("Planned {}: {}", direction, plan.stats);

	if !operator.confirm(direction, &plan.stats) {
		transport.send_code(ControlCode::Cancel).await?;
		let _ = transport.shutdown().await;
		info!("Transfer cancelled");
		return Ok(SessionOutcome::Cancelled);
	}

	let report = match direction {
		Direction::Pull => apply_pull(&mut transport, &profile.sync_dir, &plan).await?,
		Direction::Push => apply_push(&mut transport, &profile.sync_dir, &plan).await?,
	};
	transport.send_code(ControlCode::Done).await?;
	let _ = transport.shutdown().await;

	info!(
		"Done: {} directories created, {} files transferred ({} bytes), {} paths deleted",
		report.dirs_created, report.files_transferred, report.bytes_transferred, report.paths_deleted
	);
	if report.files_unavailable > 0 || report.local_failures > 0 {
		warn!(
			"{} files could not be read, {} local operations failed",
			report.files_unavailable, report.local_failures
		);
	}
	Ok(SessionOutcome::Completed(report))
}

// vim: ts=4
