//! Folder scanning.

use crate::config::FingerprintMode;
use crate::dedup::{fingerprint, Decision, DuplicateTracker, SeenRef};
use crate::error::Result;
use crate::message::MessageHeaders;
use crate::scan::state::DuplicateHit;
use crate::session::{FolderHandle, MailboxSession, MessageHandle};

/// Per-message decisions for one folder.
#[derive(Debug, Default)]
pub struct FolderScan {
    pub folder: String,
    pub decisions: Vec<(MessageHandle, Decision)>,
    pub duplicates: Vec<DuplicateHit>,
    pub parse_failures: u64,
}

/// Scan one open folder, feeding every parseable message through the
/// tracker in the order the session reports them.
///
/// Messages whose headers cannot be parsed are counted and skipped: they are
/// neither first-seen nor duplicate. The scanner only decides; it never
/// issues mark or copy operations.
pub fn scan_folder<S: MailboxSession + ?Sized>(
    session: &mut S,
    folder: &FolderHandle,
    mode: FingerprintMode,
    tracker: &mut DuplicateTracker,
) -> Result<FolderScan> {
    let messages = session.fetch_headers(folder)?;
    tracing::info!("{} message(s) to examine in {}", messages.len(), folder.name());

    let mut scan = FolderScan {
        folder: folder.name().to_string(),
        ..Default::default()
    };

    for (handle, raw) in messages {
        let headers = match MessageHeaders::parse(&raw) {
            Ok(headers) => headers,
            Err(e) => {
                tracing::warn!(
                    "Skipping message {} in {}: {}",
                    handle,
                    folder.name(),
                    e
                );
                scan.parse_failures += 1;
                continue;
            }
        };

        let fp = fingerprint(&headers, mode);
        let previous = tracker.first_seen(&fp).cloned();
        let decision = tracker.observe(
            fp,
            SeenRef {
                folder: folder.name().to_string(),
                handle,
            },
        );

        if decision == Decision::Duplicate {
            if let Some(first_seen) = previous {
                tracing::debug!(
                    "Message {}/{} is a duplicate of {}",
                    folder.name(),
                    handle,
                    first_seen
                );
                scan.duplicates.push(DuplicateHit {
                    handle,
                    first_seen,
                    summary: headers.summary(),
                });
            }
        }

        scan.decisions.push((handle, decision));
    }

    Ok(scan)
}
