//! # filesync - Encrypted Directory Synchronizer
//!
//! filesync makes one directory tree look like another across two hosts.
//! A server waits for a single client; the client picks a direction (pull
//! or push), both sides fingerprint their trees with SHA-256, and the
//! client applies the difference over one AES-256-GCM encrypted TCP
//! connection.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use filesync::config::{config_path, ProfileStore};
//! use filesync::progress::ProgressMode;
//! use filesync::session::{run_client, ConsoleOperator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = ProfileStore::load(&config_path(None))?;
//!     let profile = store.resolve("laptop")?;
//!     let mut operator = ConsoleOperator::stdio();
//!     run_client(&profile, &mut operator, ProgressMode::Visible).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod keys;
pub mod logging;
pub mod plan;
pub mod progress;
pub mod protocol;
pub mod scan;
pub mod session;
pub mod types;
pub mod validation;

// Re-export commonly used types and functions
pub use config::{Profile, ProfileStore};
pub use error::SyncError;
pub use plan::{Direction, PlanStats, SyncPlan};
pub use session::{Operator, SessionOutcome};
pub use types::{EntryKind, Fingerprint, FingerprintMap};

// vim: ts=4
