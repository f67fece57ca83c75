use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Token stored for directories in a fingerprint map
pub const DIR_TOKEN: &str = "dir";

/// Token stored for files whose content could not be hashed
pub const UNREADABLE_TOKEN: &str = "";

/// Content token of one entry in a fingerprint map
///
/// Serialized as a bare string so the wire form stays a plain
/// `path -> token` mapping.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Fingerprint {
	Dir,
	/// Base64-encoded SHA-256 of the file bytes
	File(String),
	/// Hashing failed; never equal to anything during planning
	Unreadable,
}

impl Fingerprint {
	pub fn kind(&self) -> EntryKind {
		match self {
			Fingerprint::Dir => EntryKind::Dir,
			Fingerprint::File(_) | Fingerprint::Unreadable => EntryKind::File,
		}
	}

	/// Content equality as used by the planner
	pub fn same_content(&self, other: &Fingerprint) -> bool {
		match (self, other) {
			(Fingerprint::Dir, Fingerprint::Dir) => true,
			(Fingerprint::File(a), Fingerprint::File(b)) => a == b,
			_ => false,
		}
	}
}

impl From<String> for Fingerprint {
	fn from(token: String) -> Self {
		match token.as_str() {
			DIR_TOKEN => Fingerprint::Dir,
			UNREADABLE_TOKEN => Fingerprint::Unreadable,
			_ => Fingerprint::File(token),
		}
	}
}

impl From<Fingerprint> for String {
	fn from(fp: Fingerprint) -> Self {
		match fp {
			Fingerprint::Dir => DIR_TOKEN.to_string(),
			Fingerprint::File(digest) => digest,
			Fingerprint::Unreadable => UNREADABLE_TOKEN.to_string(),
		}
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Fingerprint::Dir => write!(f, "{}", DIR_TOKEN),
			Fingerprint::File(digest) => write!(f, "{}", digest),
			Fingerprint::Unreadable => write!(f, "<unreadable>"),
		}
	}
}

/// `/`-separated relative path -> content token
pub type FingerprintMap = BTreeMap<String, Fingerprint>;

#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum EntryKind {
	Dir,
	File,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_token_roundtrip_through_json() {
		let mut map = FingerprintMap::new();
		map.insert("docs".to_string(), Fingerprint::Dir);
		map.insert("docs/a.txt".to_string(), Fingerprint::File("H1".to_string()));
		map.insert("broken.bin".to_string(), Fingerprint::Unreadable);

		let json = serde_json::to_string(&map).unwrap();
		assert_eq!(json, r#"{"broken.bin":"","docs":"dir","docs/a.txt":"H1"}"#);

		let back: FingerprintMap = serde_json::from_str(&json).unwrap();
		assert_eq!(back, map);
	}

	#[test]
	fn test_unreadable_never_same_content() {
		assert!(!Fingerprint::Unreadable.same_content(&Fingerprint::Unreadable));
		assert!(Fingerprint::Dir.same_content(&Fingerprint::Dir));
		assert!(!Fingerprint::Dir.same_content(&Fingerprint::File("dir2".to_string())));
	}

	#[test]
	fn test_kind() {
		assert_eq!(Fingerprint::Dir.kind(), EntryKind::Dir);
		assert_eq!(Fingerprint::Unreadable.kind(), EntryKind::File);
	}
}

// vim: ts=4
