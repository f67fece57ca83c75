//! Profile value validation

use std::fs;
use std::path::Path;

use super::ValidationError;
use crate::keys;

/// Validate a TCP port number read from a profile
///
/// Profiles store the port as a plain JSON number, so out-of-range values
/// reach this point as `i64` before they are narrowed.
pub fn validate_port(port: i64) -> Result<u16, ValidationError> {
	if !(0..=i64::from(u16::MAX)).contains(&port) {
		return Err(ValidationError::ConfigError(format!(
			"port must be between 0 and 65535, got {}",
			port
		)));
	}
	Ok(port as u16)
}

/// Validate the sync directory: absolute, existing, and a directory
pub fn validate_sync_dir(dir: &Path) -> Result<(), ValidationError> {
	if !dir.is_absolute() {
		return Err(ValidationError::ConfigError(format!(
			"sync directory must be an absolute path, got {}",
			dir.display()
		)));
	}
	let meta = fs::metadata(dir).map_err(|_| {
		ValidationError::ConfigError(format!("sync directory {} does not exist", dir.display()))
	})?;
	if !meta.is_dir() {
		return Err(ValidationError::ConfigError(format!(
			"sync path {} is not a directory",
			dir.display()
		)));
	}
	Ok(())
}

/// Validate the encoded secret key
pub fn validate_secret_key(encoded: &str) -> Result<(), ValidationError> {
	keys::decode_key(encoded).map(|_| ())
}

/// Validate the connect timeout in milliseconds
pub fn validate_timeout_ms(timeout_ms: u64) -> Result<(), ValidationError> {
	if timeout_ms == 0 {
		return Err(ValidationError::ConfigError("Timeout must be greater than 0".to_string()));
	}
	if timeout_ms > 3_600_000 {
		return Err(ValidationError::ConfigError(format!(
			"Timeout too large: {} ms (max 3600000)",
			timeout_ms
		)));
	}
	Ok(())
}


// vim: ts=4
