//! Plan execution
//!
//! The active side (always the client) walks a [`SyncPlan`]: deletes first,
//! then adds. A file replaced by a newer file is not deleted beforehand;
//! the received copy is renamed over it instead. Pull applies changes locally and fetches file bytes with
//! `Get`; Push turns each operation into a request for the passive side,
//! which handles them in [`serve_requests`] until `Done` or `Cancel`.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use tokio::fs as afs;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::logging::*;
use crate::plan::{SyncOperation, SyncPlan};
use crate::protocol::{ControlCode, FileSent, ProtocolError, ProtocolResult, Transport};
use crate::scan::remove_recursive;
use crate::types::EntryKind;
use crate::validation::resolve_peer_path;

/// What a run of the executor did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
	pub dirs_created: usize,
	pub files_transferred: usize,
	pub paths_deleted: usize,
	pub bytes_transferred: u64,
	/// Files the sending side could not open
	pub files_unavailable: usize,
	/// Local deletes or directory creations that failed
	pub local_failures: usize,
}

/// How the passive service loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
	Completed,
	Cancelled,
}

/// Apply `plan` to the local tree, fetching file bytes from the peer
pub async fn apply_pull<R, W>(
	transport: &mut Transport<R, W>,
	root: &Path,
	plan: &SyncPlan,
) -> ProtocolResult<ExecutionReport>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut report = ExecutionReport::default();

	let replaced = replaced_files(plan);
	for op in plan.deletes.iter().filter(|op| !replaced.contains(op.path.as_str())) {
		let local = resolve_peer_path(root, &op.path)?;
		delete_local(&local, &op.path, &mut report);
	}

	for op in &plan.adds {
		let local = resolve_peer_path(root, &op.path)?;
		match op.kind {
			EntryKind::Dir => create_local_dir(&local, &op.path, &mut report).await,
			EntryKind::File => {
				info!("Fetching file {}", op.path);
				transport.send_code(ControlCode::Get).await?;
				transport.send_string(&op.path).await?;
				receive_into(transport, &local, &op.path, &mut report).await?;
			}
		}
	}

	Ok(report)
}

/// Send `plan` to the peer as requests, streaming local file bytes
pub async fn apply_push<R, W>(
	transport: &mut Transport<R, W>,
	root: &Path,
	plan: &SyncPlan,
) -> ProtocolResult<ExecutionReport>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut report = ExecutionReport::default();

	let replaced = replaced_files(plan);
	for op in plan.deletes.iter().filter(|op| !replaced.contains(op.path.as_str())) {
		info!("Deleting remote {} {}", kind_name(op), op.path);
		transport.send_code(ControlCode::Delete).await?;
		transport.send_string(&op.path).await?;
		report.paths_deleted += 1;
	}

	for op in &plan.adds {
		match op.kind {
			EntryKind::Dir => {
				info!("Creating remote directory {}", op.path);
				transport.send_code(ControlCode::CreateDir).await?;
				transport.send_string(&op.path).await?;
				report.dirs_created += 1;
			}
			EntryKind::File => {
				let local = resolve_peer_path(root, &op.path)?;
				info!("Uploading file {}", op.path);
				transport.send_code(ControlCode::Put).await?;
				transport.send_string(&op.path).await?;
				send_from(transport, &local, &mut report).await?;
			}
		}
	}

	Ok(report)
}

/// Passive side: handle requests until the peer sends `Done` or `Cancel`
pub async fn serve_requests<R, W>(
	transport: &mut Transport<R, W>,
	root: &Path,
) -> ProtocolResult<(ServiceOutcome, ExecutionReport)>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut report = ExecutionReport::default();

	loop {
		let code = transport.recv_code().await?;
		match code {
			ControlCode::Done => return Ok((ServiceOutcome::Completed, report)),
			ControlCode::Cancel => {
				warn!("Peer cancelled the transfer");
				return Ok((ServiceOutcome::Cancelled, report));
			}
			ControlCode::Delete => {
				let rel = transport.recv_string().await?;
				let local = resolve_peer_path(root, &rel)?;
				delete_local(&local, &rel, &mut report);
			}
			ControlCode::Put => {
				let rel = transport.recv_string().await?;
				let local = resolve_peer_path(root, &rel)?;
				info!("Receiving file {}", rel);
				receive_into(transport, &local, &rel, &mut report).await?;
			}
			ControlCode::Get => {
				let rel = transport.recv_string().await?;
				let local = resolve_peer_path(root, &rel)?;
				info!("Sending file {}", rel);
				send_from(transport, &local, &mut report).await?;
			}
			ControlCode::CreateDir => {
				let rel = transport.recv_string().await?;
				let local = resolve_peer_path(root, &rel)?;
				create_local_dir(&local, &rel, &mut report).await;
			}
			ControlCode::Error => {
				return Err(ProtocolError::ProtocolViolation(
					"peer reported an error during the transfer".to_string(),
				));
			}
		}
	}
}

fn delete_local(local: &Path, rel: &str, report: &mut ExecutionReport) {
	let meta = match std::fs::symlink_metadata(local) {
		Ok(m) => m,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return,
		Err(e) => {
			warn!("Cannot access {}: {}", rel, e);
			report.local_failures += 1;
			return;
		}
	};
	if meta.is_dir() {
		info!("Deleting directory {}", rel);
	} else {
		info!("Deleting file {}", rel);
	}
	match remove_recursive(local) {
		Ok(()) => report.paths_deleted += 1,
		Err(e) => {
			warn!("Failed to delete {}: {}", rel, e);
			report.local_failures += 1;
		}
	}
}

async fn create_local_dir(local: &Path, rel: &str, report: &mut ExecutionReport) {
	info!("Creating directory {}", rel);
	match afs::create_dir_all(local).await {
		Ok(()) => report.dirs_created += 1,
		Err(e) => {
			warn!("Failed to create directory {}: {}", rel, e);
			report.local_failures += 1;
		}
	}
}

async fn receive_into<R, W>(
	transport: &mut Transport<R, W>,
	local: &Path,
	rel: &str,
	report: &mut ExecutionReport,
) -> ProtocolResult<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	match transport.recv_file(local).await {
		Ok(bytes) => {
			report.files_transferred += 1;
			report.bytes_transferred += bytes;
			Ok(())
		}
		Err(ProtocolError::RemoteFileUnavailable(_)) => {
			warn!("Peer could not provide {}, skipping", rel);
			report.files_unavailable += 1;
			Ok(())
		}
		Err(e) => Err(e),
	}
}

async fn send_from<R, W>(
	transport: &mut Transport<R, W>,
	local: &Path,
	report: &mut ExecutionReport,
) -> ProtocolResult<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	match transport.send_file(local).await? {
		FileSent::Sent(bytes) => {
			report.files_transferred += 1;
			report.bytes_transferred += bytes;
		}
		FileSent::Unavailable => report.files_unavailable += 1,
	}
	Ok(())
}

/// Files that are both deleted and re-added
///
/// These are not deleted up front: the received copy is renamed over the
/// old one, so the old file survives if the new bytes never arrive.
fn replaced_files(plan: &SyncPlan) -> HashSet<&str> {
	let added: HashSet<&str> = plan
		.adds
		.iter()
		.filter(|op| op.kind == EntryKind::File)
		.map(|op| op.path.as_str())
		.collect();
	plan.deletes
		.iter()
		.filter(|op| op.kind == EntryKind::File && added.contains(op.path.as_str()))
		.map(|op| op.path.as_str())
		.collect()
}

fn kind_name(op: &SyncOperation) -> &'static str {
	match op.kind {
		EntryKind::Dir => "directory",
		EntryKind::File => "file",
	}
}


// vim: ts=4
