//! Per-session frame encryption
//!
//! Every frame payload is sealed independently with AES-256-GCM under the
//! pre-shared key and a fresh random 96-bit nonce:
//!
//! ```text
//! +-----------+------------------------+----------+
//! | nonce 12B | ciphertext (= plain)   | tag 16B  |
//! +-----------+------------------------+----------+
//! ```
//!
//! A wrong key or a flipped bit fails tag verification, so a frame never
//! decrypts to garbage silently.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};

use super::error::ProtocolError;
use crate::keys::KEY_BYTES;

/// Nonce length prepended to every sealed payload
pub const NONCE_LEN: usize = 12;

/// Authentication tag appended by GCM
pub const TAG_LEN: usize = 16;

/// Bytes a sealed payload adds on top of its plaintext
pub const SEAL_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Encryption context shared by all frames of one session
pub struct SessionCipher {
	sealer: Aes256Gcm,
	opener: Aes256Gcm,
}

impl SessionCipher {
	/// Build the encrypt and decrypt halves from raw key bytes
	pub fn new(key: &[u8; KEY_BYTES]) -> Self {
		Self { sealer: Aes256Gcm::new(key.into()), opener: Aes256Gcm::new(key.into()) }
	}

	/// Encrypt one payload under a fresh nonce
	pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, ProtocolError> {
		let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
		let ciphertext = self
			.sealer
			.encrypt(&nonce, plaintext)
			.map_err(|e| ProtocolError::Encrypt(e.to_string()))?;

		let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
		sealed.extend_from_slice(nonce.as_slice());
		sealed.extend_from_slice(&ciphertext);
		Ok(sealed)
	}

	/// Verify and decrypt one sealed payload
	pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, ProtocolError> {
		if sealed.len() < SEAL_OVERHEAD {
			return Err(ProtocolError::Decrypt(format!(
				"sealed payload of {} bytes is shorter than nonce and tag",
				sealed.len()
			)));
		}
		let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
		self.opener
			.decrypt(Nonce::from_slice(nonce), ciphertext)
			.map_err(|_| ProtocolError::Decrypt("authentication tag mismatch".to_string()))
	}
}


// vim: ts=4
