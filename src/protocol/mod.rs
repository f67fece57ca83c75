//! Wire protocol between client and server
//!
//! A session runs over a single TCP connection. Everything except bare
//! control codes and length prefixes is encrypted with the pre-shared key.
//!
//! # Example Usage
//!
//! ```ignore
//! use filesync::protocol::{ControlCode, SessionCipher, TcpTransport};
//!
//! let mut transport = TcpTransport::over_tcp(stream, SessionCipher::new(&key));
//! transport.announce_identity().await?;
//! transport.send_code(ControlCode::Get).await?;
//! transport.send_string("docs/a.txt").await?;
//! transport.recv_file(&local_path).await?;
//! ```

pub mod cipher;
pub mod codes;
pub mod error;
pub mod identity;
pub mod transport;

pub use cipher::SessionCipher;
pub use codes::{ControlCode, STREAM_ABORT, STREAM_END};
pub use error::ProtocolError;
pub use identity::local_host_name;
pub use transport::{FileSent, TcpTransport, Transport};

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Plaintext bytes per file-stream frame
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Suffix of the hidden file a stream is received into before the rename
pub const PART_SUFFIX: &str = ".filesync-part";

/// Largest frame a peer may announce (fingerprint maps of big trees included)
pub const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

// vim: ts=4
