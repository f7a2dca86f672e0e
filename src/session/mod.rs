//! Mailbox session abstraction.
//!
//! The scanning engine only ever talks to a mail store through the
//! [`MailboxSession`] trait; the IMAP implementation lives in
//! [`imap`](self::imap) and tests substitute an in-memory one.

pub mod credentials;
pub mod imap;

use std::fmt;

use crate::error::Result;

pub use credentials::{resolve_credentials, Credentials};
pub use self::imap::ImapSession;

/// Identifier assigned by the mail store to a message within a folder.
///
/// Only valid while that folder is open in the session that produced it; not
/// comparable across folders or sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHandle(pub u32);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability object for an open folder.
///
/// Returned by [`MailboxSession::open`] and invalidated by
/// [`MailboxSession::close`] (or by opening another folder); session methods
/// reject stale handles, so message handles can never be used against the
/// wrong folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderHandle {
    name: String,
    token: u64,
    read_only: bool,
}

impl FolderHandle {
    pub fn new(name: impl Into<String>, token: u64, read_only: bool) -> Self {
        Self {
            name: name.into(),
            token,
            read_only,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

/// How duplicate messages are marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkAction {
    /// Set the standard deleted flag.
    Delete,
    /// Set a keyword instead, leaving the message undeleted.
    Tag(String),
}

impl fmt::Display for MarkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkAction::Delete => write!(f, "marked as deleted"),
            MarkAction::Tag(keyword) => write!(f, "tagged as '{}'", keyword),
        }
    }
}

/// Result of a (possibly partial) mark operation.
#[derive(Debug, Clone, Default)]
pub struct MarkOutcome {
    pub marked: u64,
    pub failed: Vec<MessageHandle>,
}

/// A stateful connection to a mail store.
///
/// One folder is active at a time. Implementations may batch or pipeline
/// header retrieval internally, but must report messages in server order.
pub trait MailboxSession {
    /// List selectable folder names in server-reported order. With a root,
    /// list the root's descendants instead.
    fn list_folders(&mut self, root: Option<&str>) -> Result<Vec<String>>;

    /// Open the named folder, read-only if requested.
    fn open(&mut self, folder: &str, read_only: bool) -> Result<FolderHandle>;

    /// Retrieve `(handle, raw header block)` for every message in the
    /// folder, in server order.
    fn fetch_headers(&mut self, folder: &FolderHandle) -> Result<Vec<(MessageHandle, Vec<u8>)>>;

    /// Copy the given messages to another folder.
    fn copy(
        &mut self,
        folder: &FolderHandle,
        messages: &[MessageHandle],
        destination: &str,
    ) -> Result<()>;

    /// Apply the mark action to the given messages. Partial success is
    /// allowed; failures are reported per message.
    fn mark(
        &mut self,
        folder: &FolderHandle,
        messages: &[MessageHandle],
        action: &MarkAction,
    ) -> Result<MarkOutcome>;

    /// Permanently purge messages marked deleted in the folder.
    fn finalize(&mut self, folder: &FolderHandle) -> Result<()>;

    /// Release the folder, invalidating its handle and all message handles
    /// obtained from it.
    fn close(&mut self, folder: FolderHandle) -> Result<()>;
}
