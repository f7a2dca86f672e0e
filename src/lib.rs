//! imap-dedup - find and remove duplicate messages in IMAP mailboxes.
//!
//! Looks for duplicate messages in a set of mailboxes and marks all but the
//! first occurrence for removal. Comparison is normally based on the
//! Message-ID header; checksum modes compare a digest of several headers
//! instead.
//!
//! # Features
//!
//! - Message-ID and header-checksum fingerprinting
//! - Cross-folder deduplication with first-folder-wins ordering
//! - Recursive folder expansion
//! - Dry-run mode that decides without mutating anything
//! - Tagging or copying duplicates instead of plain deletion
//!
//! # Example
//!
//! ```no_run
//! use imap_dedup::config::Config;
//! use imap_dedup::scan::{run, RunOptions};
//! use imap_dedup::session::{resolve_credentials, ImapSession};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(std::path::Path::new("config.toml"))?;
//!     let host = config.server.host.clone().unwrap_or_default();
//!     let credentials = resolve_credentials(&config.auth, &host)?;
//!     let mut session = ImapSession::connect(&config.server, &credentials, None, 100)?;
//!
//!     let options = RunOptions::from_config(&config.options);
//!     let result = run(&mut session, &config.options.folders, &options)?;
//!     println!("{} duplicate(s) found", result.total_duplicates());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod message;
pub mod output;
pub mod scan;
pub mod session;

// Re-exports for convenience
pub use config::{Config, FingerprintMode};
pub use dedup::{fingerprint, Decision, DuplicateTracker, Fingerprint};
pub use error::{Error, Result};
pub use message::MessageHeaders;
pub use scan::{run, RunOptions, RunResult};
pub use session::{ImapSession, MailboxSession};
