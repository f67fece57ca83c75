//! Profile configuration for filesync
//!
//! The config file is a JSON array of named profiles. It is read leniently
//! (JSON5, so comments and trailing commas are fine) and written back as
//! pretty-printed JSON with camelCase keys.
//!
//! The config file location follows a priority chain:
//! 1. `--config <path>` on the command line
//! 2. `FILESYNC_CONFIG` environment variable
//! 3. `./filesync.json`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::keys::{self, KEY_BYTES};
use crate::logging::*;
use crate::validation::{self, ValidationError, Validator};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FILESYNC_CONFIG";

/// Config file used when neither flag nor environment names one
pub const DEFAULT_CONFIG_FILE: &str = "filesync.json";

/// Port written into template profiles
pub const DEFAULT_PORT: u16 = 41152;

/// Client connect timeout when the profile does not set one
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Profile id of the template written into a fresh config file
pub const EXAMPLE_PROFILE_ID: &str = "example";

/// Resolve the config file path
pub fn config_path(cli_value: Option<&str>) -> PathBuf {
	if let Some(path) = cli_value {
		return PathBuf::from(path);
	}
	match std::env::var(CONFIG_ENV) {
		Ok(path) if !path.is_empty() => PathBuf::from(path),
		_ => PathBuf::from(DEFAULT_CONFIG_FILE),
	}
}

/// A profile exactly as stored in the config file
///
/// Every field except `id` may be missing; [`Validator::validate`] reports
/// which one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
	pub id: String,

	/// Address the client connects to (ignored by the server)
	#[serde(default)]
	pub server_host: Option<String>,

	/// Kept wide so out-of-range values reach validation instead of failing the parse
	#[serde(default)]
	pub server_port: Option<i64>,

	/// Absolute path of the synchronized directory
	#[serde(default)]
	pub sync_dir: Option<String>,

	/// Paths relative to `sync_dir` that are never scanned
	#[serde(default)]
	pub ignore_list: Option<Vec<String>>,

	/// Base64 pre-shared key
	#[serde(default)]
	pub secret_key: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub connect_timeout_ms: Option<u64>,
}

impl ProfileEntry {
	/// Template profile with placeholder values and a fresh key
	pub fn template(id: &str) -> Self {
		Self {
			id: id.to_string(),
			server_host: Some("server address (only used by the client)".to_string()),
			server_port: Some(i64::from(DEFAULT_PORT)),
			sync_dir: Some("absolute path of the directory to sync".to_string()),
			ignore_list: Some(vec!["file.txt".to_string(), "some/dir".to_string()]),
			secret_key: Some(keys::generate_key()),
			connect_timeout_ms: None,
		}
	}

	/// Validate and convert into a usable [`Profile`]
	pub fn to_profile(&self) -> Result<Profile, ValidationError> {
		self.validate()?;

		let server_host = required(&self.server_host, "serverHost")?;
		let server_port = validation::validate_port(*required(&self.server_port, "serverPort")?)?;
		let sync_dir = PathBuf::from(required(&self.sync_dir, "syncDir")?);
		let ignore_list = required(&self.ignore_list, "ignoreList")?.clone();
		let key = keys::decode_key(required(&self.secret_key, "secretKey")?)?;

		Ok(Profile {
			id: self.id.clone(),
			server_host: server_host.clone(),
			server_port,
			sync_dir,
			ignore_list,
			key,
			connect_timeout_ms: self.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
		})
	}
}

impl Validator for ProfileEntry {
	fn validate(&self) -> Result<(), ValidationError> {
		let _ = required(&self.server_host, "serverHost")?;
		let port = required(&self.server_port, "serverPort")?;
		let sync_dir = required(&self.sync_dir, "syncDir")?;
		let _ = required(&self.ignore_list, "ignoreList")?;
		let secret_key = required(&self.secret_key, "secretKey")?;

		validation::validate_port(*port)?;
		validation::validate_sync_dir(Path::new(sync_dir))?;
		validation::validate_secret_key(secret_key)?;
		if let Some(timeout_ms) = self.connect_timeout_ms {
			validation::validate_timeout_ms(timeout_ms)?;
		}
		Ok(())
	}
}

fn required<'a, T>(value: &'a Option<T>, field: &'static str) -> Result<&'a T, ValidationError> {
	value.as_ref().ok_or(ValidationError::MissingField(field))
}

/// A validated profile, ready for a session
#[derive(Clone)]
pub struct Profile {
	pub id: String,
	pub server_host: String,
	pub server_port: u16,
	pub sync_dir: PathBuf,
	pub ignore_list: Vec<String>,
	pub key: [u8; KEY_BYTES],
	pub connect_timeout_ms: u64,
}

impl fmt::Debug for Profile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Profile")
			.field("id", &self.id)
			.field("server_host", &self.server_host)
			.field("server_port", &self.server_port)
			.field("sync_dir", &self.sync_dir)
			.field("ignore_list", &self.ignore_list)
			.field("key", &"<redacted>")
			.field("connect_timeout_ms", &self.connect_timeout_ms)
			.finish()
	}
}

/// The list of profiles backed by a config file
#[derive(Debug)]
pub struct ProfileStore {
	path: PathBuf,
	profiles: Vec<ProfileEntry>,
}

impl ProfileStore {
	/// Load the config file, creating it with an example profile if missing
	pub fn load(path: &Path) -> Result<Self, SyncError> {
		if !path.exists() {
			info!("Config file {} not found, creating it", path.display());
			let store = Self {
				path: path.to_path_buf(),
				profiles: vec![ProfileEntry::template(EXAMPLE_PROFILE_ID)],
			};
			store.save()?;
			return Ok(store);
		}

		debug!("Loading config from {}", path.display());
		let text = fs::read_to_string(path).map_err(|e| SyncError::InvalidConfig {
			message: format!("cannot read {}: {}", path.display(), e),
		})?;
		let profiles: Vec<ProfileEntry> =
			json5::from_str(&text).map_err(|e| SyncError::InvalidConfig {
				message: format!("cannot parse {}: {}", path.display(), e),
			})?;
		debug!("Loaded {} profile(s)", profiles.len());

		Ok(Self { path: path.to_path_buf(), profiles })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn profiles(&self) -> &[ProfileEntry] {
		&self.profiles
	}

	pub fn find(&self, id: &str) -> Option<&ProfileEntry> {
		self.profiles.iter().find(|p| p.id == id)
	}

	/// Append a template profile and write the file
	pub fn add_template(&mut self, id: &str) -> Result<(), SyncError> {
		self.profiles.push(ProfileEntry::template(id));
		self.save()
	}

	/// Write all profiles back to the config file
	pub fn save(&self) -> Result<(), SyncError> {
		let json = serde_json::to_string_pretty(&self.profiles)
			.map_err(|e| SyncError::InvalidConfig { message: e.to_string() })?;
		fs::write(&self.path, json).map_err(|e| SyncError::InvalidConfig {
			message: format!("cannot write {}: {}", self.path.display(), e),
		})
	}

	/// Look up and validate a profile
	///
	/// An unknown id gets a template appended to the file and is reported
	/// as [`SyncError::UnknownProfile`].
	pub fn resolve(&mut self, id: &str) -> Result<Profile, SyncError> {
		let Some(entry) = self.find(id) else {
			warn!("Profile {} not found", id);
			self.add_template(id)?;
			info!("Added template profile {} to {}; edit it before use", id, self.path.display());
			return Err(SyncError::UnknownProfile { id: id.to_string() });
		};
		entry
			.to_profile()
			.map_err(|source| SyncError::InvalidProfile { id: id.to_string(), source })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn valid_entry(dir: &Path) -> ProfileEntry {
		let mut entry = ProfileEntry::template("home");
		entry.server_host = Some("127.0.0.1".to_string());
		entry.sync_dir = Some(dir.to_string_lossy().into_owned());
		entry
	}

	#[test]
	fn test_template_has_valid_key() {
		let entry = ProfileEntry::template("x");
		assert_eq!(entry.server_port, Some(41152));
		assert!(keys::decode_key(entry.secret_key.as_deref().unwrap()).is_ok());
		assert_ne!(entry.secret_key, ProfileEntry::template("x").secret_key);
	}

	#[test]
	fn test_valid_profile_converts() {
		let dir = TempDir::new().unwrap();
		let profile = valid_entry(dir.path()).to_profile().unwrap();
		assert_eq!(profile.server_port, DEFAULT_PORT);
		assert_eq!(profile.sync_dir, dir.path());
		assert_eq!(profile.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
		assert!(format!("{:?}", profile).contains("<redacted>"));
	}

	#[test]
	fn test_missing_field_reported() {
		let dir = TempDir::new().unwrap();
		let mut entry = valid_entry(dir.path());
		entry.ignore_list = None;
		assert_eq!(entry.validate(), Err(ValidationError::MissingField("ignoreList")));
	}

	#[test]
	fn test_out_of_range_port_rejected() {
		let dir = TempDir::new().unwrap();
		let mut entry = valid_entry(dir.path());
		entry.server_port = Some(70000);
		assert!(matches!(entry.validate(), Err(ValidationError::ConfigError(_))));
	}

	#[test]
	fn test_template_sync_dir_rejected() {
		let entry = ProfileEntry::template("x");
		assert!(entry.to_profile().is_err());
	}

	#[test]
	fn test_short_key_rejected() {
		let dir = TempDir::new().unwrap();
		let mut entry = valid_entry(dir.path());
		entry.secret_key = Some("c2hvcnQ=".to_string());
		let err = entry.validate().unwrap_err();
		assert!(err.to_string().contains("44 characters"));
	}

	#[test]
	fn test_missing_file_created_with_example() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("filesync.json");

		let store = ProfileStore::load(&path).unwrap();
		assert!(path.exists());
		assert!(store.find(EXAMPLE_PROFILE_ID).is_some());
	}

	#[test]
	fn test_unknown_profile_appends_template() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("filesync.json");

		let mut store = ProfileStore::load(&path).unwrap();
		let err = store.resolve("laptop").unwrap_err();
		assert_eq!(err.exit_code(), -3);

		let reloaded = ProfileStore::load(&path).unwrap();
		assert_eq!(reloaded.profiles().len(), 2);
		assert!(reloaded.find("laptop").is_some());
	}

	#[test]
	fn test_lenient_read_with_comments() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("filesync.json");
		let key = keys::generate_key();
		let text = format!(
			"[\n  // home profile\n  {{ id: \"home\", serverHost: \"localhost\", serverPort: 9000, \
			 syncDir: {:?}, ignoreList: [\"tmp\"], secretKey: \"{}\", }},\n]",
			dir.path().to_string_lossy(),
			key
		);
		fs::write(&path, text).unwrap();

		let mut store = ProfileStore::load(&path).unwrap();
		let profile = store.resolve("home").unwrap();
		assert_eq!(profile.server_port, 9000);
		assert_eq!(profile.ignore_list, vec!["tmp".to_string()]);
	}

	#[test]
	fn test_invalid_profile_exit_code() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("filesync.json");
		fs::write(&path, r#"[{"id": "bad", "serverHost": "h"}]"#).unwrap();

		let mut store = ProfileStore::load(&path).unwrap();
		let err = store.resolve("bad").unwrap_err();
		assert_eq!(err.exit_code(), -4);
	}

	#[test]
	fn test_saved_file_uses_camel_case() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("filesync.json");
		ProfileStore::load(&path).unwrap();
		let text = fs::read_to_string(&path).unwrap();
		assert!(text.contains("\"serverPort\": 41152"));
		assert!(text.contains("\"secretKey\""));
		assert!(!text.contains("connectTimeoutMs"));
	}

	#[test]
	fn test_config_path_flag_wins() {
		assert_eq!(config_path(Some("/tmp/a.json")), PathBuf::from("/tmp/a.json"));
	}
}

// vim: ts=4
