//! Pre-shared key material
//!
//! The secret is 32 random bytes stored as standard padded Base64, which is
//! always 44 characters long.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::validation::ValidationError;

/// Raw key length in bytes (AES-256)
pub const KEY_BYTES: usize = 32;

/// Length of the Base64-encoded key as stored in a profile
pub const ENCODED_KEY_LEN: usize = 44;

/// Generate a fresh random key, Base64-encoded
pub fn generate_key() -> String {
	let key = Aes256Gcm::generate_key(&mut OsRng);
	STANDARD.encode(key.as_slice())
}

/// Decode a profile secret into raw key bytes
pub fn decode_key(encoded: &str) -> Result<[u8; KEY_BYTES], ValidationError> {
	if encoded.len() != ENCODED_KEY_LEN {
		return Err(ValidationError::ConfigError(format!(
			"secret key must be {} characters, got {}",
			ENCODED_KEY_LEN,
			encoded.len()
		)));
	}
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| ValidationError::ConfigError(format!("secret key is not Base64: {}", e)))?;
	let mut key = [0u8; KEY_BYTES];
	if bytes.len() != KEY_BYTES {
		return Err(ValidationError::ConfigError(format!(
			"secret key must decode to {} bytes, got {}",
			KEY_BYTES,
			bytes.len()
		)));
	}
	key.copy_from_slice(&bytes);
	Ok(key)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generated_key_has_profile_length() {
		let key = generate_key();
		assert_eq!(key.len(), ENCODED_KEY_LEN);
		assert!(decode_key(&key).is_ok());
	}

	#[test]
	fn test_generated_keys_differ() {
		assert_ne!(generate_key(), generate_key());
	}

	#[test]
	fn test_decode_wrong_length() {
		let result = decode_key("c2hvcnQ=");
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("44 characters"));
	}

	#[test]
	fn test_decode_not_base64() {
		let bogus = "!".repeat(ENCODED_KEY_LEN);
		let result = decode_key(&bogus);
		assert!(result.unwrap_err().to_string().contains("not Base64"));
	}
}

// vim: ts=4
