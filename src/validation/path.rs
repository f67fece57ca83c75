//! Path validation functions

use std::path::{Component, Path, PathBuf};

use super::ValidationError;

/// Check if a path is safe (no parent directory references)
pub fn is_path_safe(path: &Path) -> bool {
	!path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Check if path has no absolute components
pub fn is_path_relative(path: &Path) -> bool {
	!path.is_absolute() && !path.components().any(|c| matches!(c, Component::Prefix(_)))
}

/// Resolve a `/`-separated relative path from the peer against `root`
///
/// Rejects empty, absolute and `..`-containing paths so nothing the peer
/// sends can reach outside the sync directory.
pub fn resolve_peer_path(root: &Path, rel: &str) -> Result<PathBuf, ValidationError> {
	let rel_path = Path::new(rel);
	if rel.is_empty() {
		return Err(ValidationError::PathError("Path must not be empty".to_string()));
	}
	if !is_path_relative(rel_path) {
		return Err(ValidationError::PathError(format!(
			"Path must be relative, got absolute path: {:?}",
			rel
		)));
	}
	if !is_path_safe(rel_path) {
		return Err(ValidationError::PathError(format!(
			"Path contains parent directory reference (..): {:?}",
			rel
		)));
	}
	Ok(rel.split('/').filter(|part| !part.is_empty() && *part != ".").fold(
		root.to_path_buf(),
		|acc, part| acc.join(part),
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_is_path_safe_normal() {
		assert!(is_path_safe(Path::new("file.txt")));
		assert!(is_path_safe(Path::new("dir/file.txt")));
		assert!(is_path_safe(Path::new("a/b/c/file.txt")));
	}

	#[test]
	fn test_is_path_safe_with_parent() {
		assert!(!is_path_safe(Path::new("../file.txt")));
		assert!(!is_path_safe(Path::new("dir/../file.txt")));
		assert!(!is_path_safe(Path::new("a/b/../../file.txt")));
	}

	#[test]
	fn test_is_path_relative() {
		assert!(is_path_relative(Path::new("file.txt")));
		assert!(!is_path_relative(Path::new("/dir/file.txt")));
	}

	#[test]
	fn test_resolve_peer_path_nested() {
		let root = Path::new("/srv/sync");
		let resolved = resolve_peer_path(root, "docs/notes/a.txt").unwrap();
		assert_eq!(resolved, PathBuf::from("/srv/sync/docs/notes/a.txt"));
	}

	#[test]
	fn test_resolve_peer_path_rejects_escape() {
		let root = Path::new("/srv/sync");
		let result = resolve_peer_path(root, "../etc/passwd");
		assert!(result.unwrap_err().to_string().contains("parent directory"));
	}

	#[test]
	fn test_resolve_peer_path_rejects_absolute() {
		let root = Path::new("/srv/sync");
		let result = resolve_peer_path(root, "/etc/passwd");
		assert!(result.unwrap_err().to_string().contains("must be relative"));
	}

	#[test]
	fn test_resolve_peer_path_rejects_empty() {
		assert!(resolve_peer_path(Path::new("/srv/sync"), "").is_err());
	}
}

// vim: ts=4
