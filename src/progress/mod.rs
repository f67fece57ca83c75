//! Byte progress display for hashing and transfers
//!
//! Progress is purely cosmetic: it is drawn as a single carriage-return
//! line on stderr and never influences what gets synced.

pub mod constants;

use std::io::Write;
use std::time::Instant;

pub use constants::*;

/// Whether progress lines are drawn at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
	Visible,
	Hidden,
}

/// Progress of one file being hashed, sent or received
#[derive(Debug)]
pub struct ByteProgress {
	label: &'static str,
	total: Option<u64>,
	done: u64,
	last_update: Instant,
	active: bool,
}

impl ByteProgress {
	/// Start tracking; `total` is unknown on the receiving side of a stream
	pub fn new(mode: ProgressMode, label: &'static str, total: Option<u64>) -> Self {
		let active = match (mode, total) {
			(ProgressMode::Hidden, _) => false,
			(ProgressMode::Visible, Some(total)) => total > MIN_REPORTED_BYTES,
			(ProgressMode::Visible, None) => true,
		};
		Self { label, total, done: 0, last_update: Instant::now(), active }
	}

	/// Record `n` more bytes
	pub fn advance(&mut self, n: u64) {
		self.done += n;
		if !self.active {
			return;
		}
		if self.last_update.elapsed().as_millis() < UPDATE_THROTTLE_MS {
			return;
		}
		self.last_update = Instant::now();
		let _ = write!(std::io::stderr(), "\r  {}", self.render());
		let _ = std::io::stderr().flush();
	}

	/// Bytes recorded so far
	pub fn done(&self) -> u64 {
		self.done
	}

	/// Clear the progress line
	pub fn finish(self) {
		if self.active {
			let _ = write!(std::io::stderr(), "\r{}\r", " ".repeat(PROGRESS_BAR_WIDTH + 60));
			let _ = std::io::stderr().flush();
		}
	}

	fn render(&self) -> String {
		match self.total {
			Some(total) if total > 0 => {
				let ratio = (self.done as f64 / total as f64).clamp(0.0, 1.0);
				let filled = (ratio * PROGRESS_BAR_WIDTH as f64) as usize;
				format!(
					"{} [{}{}] {}/{} ({:.1}%)",
					self.label,
					"=".repeat(filled),
					"-".repeat(PROGRESS_BAR_WIDTH - filled),
					self.done,
					total,
					ratio * 100.0
				)
			}
			_ => format!("{} {:.1} MB", self.label, self.done as f64 / BYTES_PER_MB),
		}
	}
}


// vim: ts=4
