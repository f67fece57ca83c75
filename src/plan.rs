//! Diff planning between two fingerprint maps
//!
//! A plan makes a destination look like a source. Replaced entries appear
//! in both lists, so applying every delete before every add is always
//! correct. Adds are ordered directories first, parents before children.

use std::fmt;

use crate::types::{EntryKind, FingerprintMap};

/// Which side is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Remote is authoritative: apply remote -> local
	Pull,
	/// Local is authoritative: apply local -> remote
	Push,
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Direction::Pull => write!(f, "pull (server -> local)"),
			Direction::Push => write!(f, "push (local -> server)"),
		}
	}
}

/// One entry of an add-list or delete-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOperation {
	pub path: String,
	pub kind: EntryKind,
}

impl SyncOperation {
	fn new(path: &str, kind: EntryKind) -> Self {
		Self { path: path.to_string(), kind }
	}
}

/// Informational counters shown before confirmation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanStats {
	pub ignored: usize,
	pub added: usize,
	pub deleted: usize,
	pub changed: usize,
	pub unchanged: usize,
}

impl fmt::Display for PlanStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"ignored {}, added {}, deleted {}, changed {}, unchanged {}",
			self.ignored, self.added, self.deleted, self.changed, self.unchanged
		)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
	pub adds: Vec<SyncOperation>,
	pub deletes: Vec<SyncOperation>,
	pub stats: PlanStats,
}

impl SyncPlan {
	pub fn is_empty(&self) -> bool {
		self.adds.is_empty() && self.deletes.is_empty()
	}
}

/// Compute the operations that turn `dest` into `source`
pub fn plan(source: &FingerprintMap, dest: &FingerprintMap) -> SyncPlan {
	let mut result = SyncPlan::default();

	for (path, token) in dest {
		if !source.contains_key(path) {
			result.deletes.push(SyncOperation::new(path, token.kind()));
			result.stats.deleted += 1;
		}
	}

	for (path, token) in source {
		match dest.get(path) {
			None => {
				result.adds.push(SyncOperation::new(path, token.kind()));
				result.stats.added += 1;
			}
			Some(existing) if existing.same_content(token) => {
				result.stats.unchanged += 1;
			}
			Some(existing) => {
				result.deletes.push(SyncOperation::new(path, existing.kind()));
				result.adds.push(SyncOperation::new(path, token.kind()));
				result.stats.changed += 1;
			}
		}
	}

	order_adds(&mut result.adds);
	result
}

/// Plan for a session direction; `ignored` is carried into the stats
pub fn plan_for(
	direction: Direction,
	local: &FingerprintMap,
	remote: &FingerprintMap,
	ignored: usize,
) -> SyncPlan {
	let mut result = match direction {
		Direction::Pull => plan(remote, local),
		Direction::Push => plan(local, remote),
	};
	result.stats.ignored = ignored;
	result
}

/// Directories before files; within a kind, shallower paths first
fn order_adds(adds: &mut [SyncOperation]) {
	adds.sort_by(|a, b| {
		a.kind
			.cmp(&b.kind)
			.then_with(|| depth(&a.path).cmp(&depth(&b.path)))
			.then_with(|| a.path.cmp(&b.path))
	});
}

fn depth(path: &str) -> usize {
	path.matches('/').count()
}


// vim: ts=4
