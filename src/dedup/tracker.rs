//! Duplicate tracking.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::dedup::fingerprint::Fingerprint;
use crate::session::MessageHandle;

/// Outcome of observing one message's fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First message in the run with this fingerprint; it survives.
    FirstSeen,
    /// The fingerprint was recorded earlier in the run.
    Duplicate,
}

/// Where a fingerprint was first observed. Kept for diagnostics only;
/// presence in the tracker is what decides duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRef {
    pub folder: String,
    pub handle: MessageHandle,
}

impl fmt::Display for SeenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder, self.handle)
    }
}

/// The set of fingerprints seen so far in one run.
///
/// Grows monotonically for the duration of the run and is never persisted.
/// Must be fed sequentially, in folder-then-position order, for the
/// first-seen-wins invariant to hold.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashMap<Fingerprint, SeenRef>,
}

impl DuplicateTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation and decide whether it is the first with this
    /// fingerprint.
    pub fn observe(&mut self, fingerprint: Fingerprint, origin: SeenRef) -> Decision {
        match self.seen.entry(fingerprint) {
            Entry::Occupied(_) => Decision::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(origin);
                Decision::FirstSeen
            }
        }
    }

    /// The first observation recorded for a fingerprint, if any.
    pub fn first_seen(&self, fingerprint: &Fingerprint) -> Option<&SeenRef> {
        self.seen.get(fingerprint)
    }

    /// Number of distinct fingerprints observed so far.
    pub fn distinct(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FingerprintMode;
    use crate::dedup::fingerprint::fingerprint;
    use crate::message::MessageHeaders;

    fn fp(id: &str) -> Fingerprint {
        let headers = MessageHeaders {
            message_id: Some(id.to_string()),
            ..Default::default()
        };
        fingerprint(&headers, FingerprintMode::MessageId)
    }

    fn origin(folder: &str, uid: u32) -> SeenRef {
        SeenRef {
            folder: folder.to_string(),
            handle: MessageHandle(uid),
        }
    }

    #[test]
    fn test_first_observation_wins() {
        let mut tracker = DuplicateTracker::new();

        assert_eq!(
            tracker.observe(fp("<x@y>"), origin("INBOX", 1)),
            Decision::FirstSeen
        );
        assert_eq!(
            tracker.observe(fp("<x@y>"), origin("INBOX", 2)),
            Decision::Duplicate
        );
        assert_eq!(
            tracker.observe(fp("<z@w>"), origin("INBOX", 3)),
            Decision::FirstSeen
        );
        assert_eq!(tracker.distinct(), 2);
    }

    #[test]
    fn test_duplicates_detected_across_folders() {
        let mut tracker = DuplicateTracker::new();

        assert_eq!(
            tracker.observe(fp("<x@y>"), origin("INBOX", 1)),
            Decision::FirstSeen
        );
        assert_eq!(
            tracker.observe(fp("<x@y>"), origin("Archive", 9)),
            Decision::Duplicate
        );
    }

    #[test]
    fn test_first_seen_keeps_original_origin() {
        let mut tracker = DuplicateTracker::new();
        tracker.observe(fp("<x@y>"), origin("INBOX", 1));
        tracker.observe(fp("<x@y>"), origin("Archive", 9));

        let first = tracker.first_seen(&fp("<x@y>")).unwrap();
        assert_eq!(first.folder, "INBOX");
        assert_eq!(first.handle, MessageHandle(1));
        assert_eq!(first.to_string(), "INBOX/1");
    }
}
