//! End-to-end sessions
//!
//! A session is one connection between one client and one server. The
//! server is always passive; the client decides the direction and drives
//! the transfer.

pub mod client;
pub mod server;

use std::io::{self, BufRead, Write};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::SyncError;
use crate::execute::ExecutionReport;
use crate::plan::{Direction, PlanStats};
use crate::progress::ProgressMode;
use crate::protocol::{ProtocolError, ProtocolResult, Transport};
use crate::scan::{ContentScanner, ScanResult};

pub use client::{client_session, run_client};
pub use server::{run_server, serve_one, server_session};

/// How a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
	Completed(ExecutionReport),
	/// The operator declined, or the peer cancelled
	Cancelled,
}

/// The person (or script) answering the client's questions
pub trait Operator {
	/// `None` means the answer was not a valid direction
	fn choose_direction(&mut self) -> Option<Direction>;

	/// Whether to apply a plan with these counters
	fn confirm(&mut self, direction: Direction, stats: &PlanStats) -> bool;
}

/// Operator reading answers line by line
pub struct ConsoleOperator<I, O> {
	input: I,
	output: O,
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
	pub fn stdio() -> Self {
		Self::new(io::stdin().lock(), io::stdout())
	}
}

impl<I: BufRead, O: Write> ConsoleOperator<I, O> {
	pub fn new(input: I, output: O) -> Self {
		Self { input, output }
	}

	fn ask(&mut self, prompt: &str) -> String {
		let _ = write!(self.output, "{}", prompt);
		let _ = self.output.flush();
		let mut line = String::new();
		if self.input.read_line(&mut line).is_err() {
			line.clear();
		}
		line.trim().to_string()
	}
}

impl<I: BufRead, O: Write> Operator for ConsoleOperator<I, O> {
	fn choose_direction(&mut self) -> Option<Direction> {
		let _ = writeln!(self.output, "1) {}", Direction::Pull);
		let _ = writeln!(self.output, "2) {}", Direction::Push);
		match self.ask("Choose 1 or 2: ").as_str() {
			"1" => Some(Direction::Pull),
			"2" => Some(Direction::Push),
			_ => None,
		}
	}

	fn confirm(&mut self, direction: Direction, stats: &PlanStats) -> bool {
		let _ = writeln!(self.output, "Ignored:   {}", stats.ignored);
		let _ = writeln!(self.output, "Added:     {}", stats.added);
		let _ = writeln!(self.output, "Deleted:   {}", stats.deleted);
		let _ = writeln!(self.output, "Changed:   {}", stats.changed);
		let _ = writeln!(self.output, "Unchanged: {}", stats.unchanged);
		self.ask(&format!("Continue with {}? (yes/no) ", direction)).eq_ignore_ascii_case("yes")
	}
}

/// Send our ignore list, receive the peer's, return the union
pub(crate) async fn exchange_ignore_lists<R, W>(
	transport: &mut Transport<R, W>,
	own: &[String],
) -> ProtocolResult<Vec<String>>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	transport.send_structure(&own).await?;
	let peer: Vec<String> = transport.recv_structure().await?;

	let mut union = own.to_vec();
	for entry in peer {
		if !union.contains(&entry) {
			union.push(entry);
		}
	}
	Ok(union)
}

/// Fingerprint `root` on the blocking pool
pub(crate) async fn scan_tree(
	root: &Path,
	ignore_list: &[String],
	progress: ProgressMode,
) -> Result<ScanResult, SyncError> {
	let scanner = ContentScanner::new(root, ignore_list).with_progress(progress);
	tokio::task::spawn_blocking(move || scanner.scan()).await.map_err(|e| {
		SyncError::Io(io::Error::new(io::ErrorKind::Other, format!("scan task failed: {}", e)))
	})
}

/// Map an identity failure: a frame we cannot decrypt means a different key
pub(crate) fn identity_error(e: ProtocolError) -> SyncError {
	if e.is_decrypt_failure() {
		SyncError::AuthenticationFailed { message: format!("peer uses a different key ({})", e) }
	} else {
		SyncError::Protocol(e)
	}
}


// vim: ts=4
