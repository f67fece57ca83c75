//! Directory fingerprinting
//!
//! Walks a sync root and records every directory with the `dir` token and
//! every regular file with the Base64 SHA-256 of its bytes. Ignore entries
//! are matched by exact absolute path, so ignoring a directory prunes its
//! whole subtree while ignoring a file leaves its siblings alone.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::logging::*;
use crate::progress::{ByteProgress, ProgressMode};
use crate::protocol::PART_SUFFIX;
use crate::types::{Fingerprint, FingerprintMap};

/// Read buffer used while hashing
pub const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Outcome of one scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
	pub map: FingerprintMap,
	/// Ignored entries encountered (an ignored directory counts once)
	pub ignored: usize,
}

/// Accumulator threaded through the recursive walk
struct ScanState {
	map: FingerprintMap,
	ignored: usize,
}

pub struct ContentScanner {
	root: PathBuf,
	ignore: HashSet<PathBuf>,
	progress: ProgressMode,
}

impl ContentScanner {
	/// Prepare a scan of `root`; ignore entries are relative to it
	pub fn new(root: &Path, ignore_list: &[String]) -> Self {
		let ignore = ignore_list.iter().map(|entry| join_relative(root, entry)).collect();
		Self { root: root.to_path_buf(), ignore, progress: ProgressMode::Hidden }
	}

	pub fn with_progress(mut self, progress: ProgressMode) -> Self {
		self.progress = progress;
		self
	}

	pub fn is_ignored(&self, path: &Path) -> bool {
		self.ignore.contains(path)
	}

	pub fn scan(&self) -> ScanResult {
		info!("Scanning {}", self.root.display());
		let mut state = ScanState { map: FingerprintMap::new(), ignored: 0 };
		self.scan_dir(&self.root, &mut state);
		info!("Scan finished: {} entries, {} ignored", state.map.len(), state.ignored);
		ScanResult { map: state.map, ignored: state.ignored }
	}

	fn scan_dir(&self, dir: &Path, state: &mut ScanState) {
		let entries = match fs::read_dir(dir) {
			Ok(e) => e,
			Err(e) => {
				warn!("Cannot read directory {}: {}", dir.display(), e);
				return;
			}
		};

		for entry_result in entries {
			let entry = match entry_result {
				Ok(e) => e,
				Err(e) => {
					debug!("Error reading directory entry: {}", e);
					continue;
				}
			};

			let path = entry.path();
			let meta = match fs::symlink_metadata(&path) {
				Ok(m) => m,
				Err(e) => {
					warn!("Cannot access {}: {}", path.display(), e);
					continue;
				}
			};

			let rel = match self.relative_key(&path) {
				Some(rel) => rel,
				None => {
					warn!("Skipping {}: name is not valid UTF-8", path.display());
					continue;
				}
			};

			if meta.is_dir() {
				if self.is_ignored(&path) {
					info!("Ignoring directory {}", rel);
					state.ignored += 1;
					continue;
				}
				debug!("Scanning directory {}", rel);
				state.map.insert(rel, Fingerprint::Dir);
				self.scan_dir(&path, state);
			} else if meta.is_file() {
				if self.is_ignored(&path) {
					info!("Ignoring file {}", rel);
					state.ignored += 1;
					continue;
				}
				if rel.ends_with(PART_SUFFIX) {
					debug!("Skipping partial transfer {}", rel);
					continue;
				}
				let fingerprint = match hash_file(&path, meta.len(), self.progress) {
					Ok(digest) => Fingerprint::File(digest),
					Err(e) => {
						warn!("Cannot hash {}: {}", rel, e);
						Fingerprint::Unreadable
					}
				};
				debug!("{} -> {}", rel, fingerprint);
				state.map.insert(rel, fingerprint);
			} else {
				debug!("Skipping special file {}", rel);
			}
		}
	}

	fn relative_key(&self, path: &Path) -> Option<String> {
		let rel = path.strip_prefix(&self.root).ok()?;
		let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
		Some(parts?.join("/"))
	}
}

/// Scan `root` honoring `ignore_list`
pub fn scan(root: &Path, ignore_list: &[String]) -> ScanResult {
	ContentScanner::new(root, ignore_list).scan()
}

/// Base64 SHA-256 of a file, read in bounded chunks
pub fn hash_file(path: &Path, total: u64, progress: ProgressMode) -> io::Result<String> {
	let mut file = fs::File::open(path)?;
	let mut hasher = Sha256::new();
	let mut buf = vec![0u8; HASH_BUFFER_SIZE];
	let mut bar = ByteProgress::new(progress, "Hashing", Some(total));

	loop {
		let n = file.read(&mut buf)?;
		if n == 0 {
			break;
		}
		hasher.update(&buf[..n]);
		bar.advance(n as u64);
	}
	bar.finish();

	Ok(STANDARD.encode(hasher.finalize()))
}

/// Base64 SHA-256 of an in-memory buffer
pub fn hash_bytes(data: &[u8]) -> String {
	STANDARD.encode(Sha256::digest(data))
}

/// Delete `path` and everything below it; a missing path is not an error
pub fn remove_recursive(path: &Path) -> io::Result<()> {
	let meta = match fs::symlink_metadata(path) {
		Ok(m) => m,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
		Err(e) => return Err(e),
	};

	if meta.is_dir() {
		for entry in fs::read_dir(path)? {
			remove_recursive(&entry?.path())?;
		}
		fs::remove_dir(path)
	} else {
		fs::remove_file(path)
	}
}

fn join_relative(root: &Path, rel: &str) -> PathBuf {
	rel.split('/').filter(|part| !part.is_empty()).fold(root.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn create_file(dir: &Path, name: &str, content: &[u8]) {
		let path = dir.join(name);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(path, content).unwrap();
	}

	#[test]
	fn test_scan_empty_directory() {
		let dir = TempDir::new().unwrap();
		let result = scan(dir.path(), &[]);
		assert!(result.map.is_empty());
		assert_eq!(result.ignored, 0);
	}

	#[test]
	fn test_scan_records_dirs_and_digests() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "abc.txt", b"abc");
		create_file(dir.path(), "nested/deeper/file.bin", b"payload");

		let result = scan(dir.path(), &[]);

		assert_eq!(
			result.map.get("abc.txt"),
			Some(&Fingerprint::File("ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=".to_string()))
		);
		assert_eq!(result.map.get("nested"), Some(&Fingerprint::Dir));
		assert_eq!(result.map.get("nested/deeper"), Some(&Fingerprint::Dir));
		assert_eq!(
			result.map.get("nested/deeper/file.bin"),
			Some(&Fingerprint::File(hash_bytes(b"payload")))
		);
		assert_eq!(result.map.len(), 4);
	}

	#[test]
	fn test_empty_file_digest() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "empty", b"");
		let result = scan(dir.path(), &[]);
		assert_eq!(
			result.map.get("empty"),
			Some(&Fingerprint::File("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=".to_string()))
		);
	}

	#[test]
	fn test_ignored_directory_prunes_subtree() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "keep.txt", b"k");
		create_file(dir.path(), "build/out.o", b"o");
		create_file(dir.path(), "build/sub/more.o", b"m");

		let result = scan(dir.path(), &["build".to_string()]);

		assert_eq!(result.ignored, 1);
		assert!(result.map.keys().all(|k| !k.starts_with("build")));
		assert!(result.map.contains_key("keep.txt"));
	}

	#[test]
	fn test_ignored_file_leaves_siblings() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "logs/a.log", b"a");
		create_file(dir.path(), "logs/b.log", b"b");

		let result = scan(dir.path(), &["logs/a.log".to_string()]);

		assert_eq!(result.ignored, 1);
		assert!(!result.map.contains_key("logs/a.log"));
		assert!(result.map.contains_key("logs/b.log"));
		assert_eq!(result.map.get("logs"), Some(&Fingerprint::Dir));
	}

	#[test]
	fn test_ignore_is_exact_match_not_prefix() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "data", b"1");
		create_file(dir.path(), "data.bak", b"2");

		let result = scan(dir.path(), &["data".to_string()]);

		assert!(!result.map.contains_key("data"));
		assert!(result.map.contains_key("data.bak"));
	}

	#[test]
	fn test_missing_ignore_entry_is_not_counted() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "a.txt", b"a");
		let result = scan(dir.path(), &["does-not-exist".to_string()]);
		assert_eq!(result.ignored, 0);
		assert_eq!(result.map.len(), 1);
	}

	#[cfg(unix)]
	#[test]
	fn test_unreadable_file_is_recorded() {
		use std::os::unix::fs::PermissionsExt;

		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "secret.txt", b"s");
		create_file(dir.path(), "plain.txt", b"p");
		let secret = dir.path().join("secret.txt");
		fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

		// Running as root bypasses permission bits
		if fs::File::open(&secret).is_ok() {
			fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
			return;
		}

		let result = scan(dir.path(), &[]);
		assert_eq!(result.map.get("secret.txt"), Some(&Fingerprint::Unreadable));
		assert!(result.map.contains_key("plain.txt"));

		fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
	}

	#[test]
	fn test_partial_transfer_not_recorded() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "a.txt", b"a");
		create_file(dir.path(), ".a.txt.filesync-part", b"half");

		let result = scan(dir.path(), &[]);
		assert_eq!(result.map.keys().collect::<Vec<_>>(), vec!["a.txt"]);
		assert_eq!(result.ignored, 0);
	}

	#[test]
	fn test_remove_recursive_tree() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "tree/a/b/c.txt", b"c");
		create_file(dir.path(), "tree/d.txt", b"d");

		remove_recursive(&dir.path().join("tree")).unwrap();
		assert!(!dir.path().join("tree").exists());
	}

	#[test]
	fn test_remove_recursive_file_and_missing() {
		let dir = TempDir::new().unwrap();
		create_file(dir.path(), "one.txt", b"1");

		remove_recursive(&dir.path().join("one.txt")).unwrap();
		assert!(!dir.path().join("one.txt").exists());

		assert!(remove_recursive(&dir.path().join("never-existed")).is_ok());
	}
}

// vim: ts=4
