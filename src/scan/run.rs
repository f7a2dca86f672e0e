//! Run orchestration.

use crate::config::{FingerprintMode, OptionsConfig};
use crate::dedup::DuplicateTracker;
use crate::error::Result;
use crate::scan::folder::scan_folder;
use crate::scan::state::{FolderOutcome, RunResult};
use crate::session::{MailboxSession, MarkAction, MessageHandle};

/// Options for one deduplication run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: FingerprintMode,
    pub dry_run: bool,
    pub recursive: bool,
    pub reverse: bool,
    pub no_finalize: bool,
    pub action: MarkAction,
    pub copy_to: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: FingerprintMode::default(),
            dry_run: false,
            recursive: false,
            reverse: false,
            no_finalize: false,
            action: MarkAction::Delete,
            copy_to: None,
        }
    }
}

impl RunOptions {
    /// Build run options from the validated configuration.
    pub fn from_config(options: &OptionsConfig) -> Self {
        Self {
            mode: options.mode,
            dry_run: options.dry_run,
            recursive: options.recursive,
            reverse: options.reverse,
            no_finalize: options.no_finalize,
            action: match &options.tag {
                Some(keyword) => MarkAction::Tag(keyword.clone()),
                None => MarkAction::Delete,
            },
            copy_to: options.copy_to.clone(),
        }
    }
}

/// Replace each recursion root by itself followed by its descendants (in
/// server-reported order), then apply reverse ordering.
fn expand_folders<S: MailboxSession + ?Sized>(
    session: &mut S,
    folders: &[String],
    options: &RunOptions,
) -> Result<Vec<String>> {
    let mut expanded = Vec::new();

    for folder in folders {
        expanded.push(folder.clone());
        if options.recursive {
            let children = session.list_folders(Some(folder))?;
            tracing::info!(
                "Working recursively from {}: {} folder(s) in total",
                folder,
                children.len() + 1
            );
            expanded.extend(children);
        }
    }

    if options.reverse {
        expanded.reverse();
    }

    Ok(expanded)
}

/// Run the deduplication engine over the given folders, strictly in order.
///
/// One seen-set is shared across the whole run, so the first occurrence of a
/// fingerprint in folder-then-position order survives and every later one is
/// marked. A folder that cannot be opened fails the run; marks already
/// applied to earlier folders are not rolled back.
pub fn run<S: MailboxSession + ?Sized>(
    session: &mut S,
    folders: &[String],
    options: &RunOptions,
) -> Result<RunResult> {
    let folders = expand_folders(session, folders, options)?;
    if folders.len() > 1 {
        tracing::info!("Working with folders in order: {}", folders.join(", "));
    }

    let mut tracker = DuplicateTracker::new();
    let mut result = RunResult::new(options.mode, options.dry_run);

    for name in &folders {
        let folder = session.open(name, options.dry_run)?;
        let scan = scan_folder(session, &folder, options.mode, &mut tracker)?;

        let mut outcome = FolderOutcome {
            folder: name.clone(),
            scanned: scan.decisions.len() as u64 + scan.parse_failures,
            parse_failures: scan.parse_failures,
            duplicates: scan.duplicates,
            marked: 0,
            mark_failures: 0,
        };

        let handles: Vec<MessageHandle> = outcome.duplicates.iter().map(|d| d.handle).collect();

        if handles.is_empty() {
            tracing::info!("No duplicates were found in {}", name);
        } else if options.dry_run {
            tracing::info!(
                "{} message(s) in {} would be {}",
                handles.len(),
                name,
                options.action
            );
        } else {
            let mut copy_failed = false;

            if let Some(destination) = &options.copy_to {
                tracing::info!(
                    "Copying {} message(s) from {} to {}...",
                    handles.len(),
                    name,
                    destination
                );
                if let Err(e) = session.copy(&folder, &handles, destination) {
                    tracing::error!("Copy to {} failed, not marking {}: {}", destination, name, e);
                    outcome.mark_failures = handles.len() as u64;
                    copy_failed = true;
                }
            }

            if !copy_failed {
                tracing::info!("{} message(s) in {} being {}...", handles.len(), name, options.action);
                match session.mark(&folder, &handles, &options.action) {
                    Ok(mark) => {
                        for failed in &mark.failed {
                            tracing::warn!("Could not mark message {} in {}", failed, name);
                        }
                        outcome.marked = mark.marked;
                        outcome.mark_failures = mark.failed.len() as u64;
                    }
                    Err(e) => {
                        tracing::error!("Mark operation failed in {}: {}", name, e);
                        outcome.mark_failures = handles.len() as u64;
                    }
                }

                let deleting = matches!(options.action, MarkAction::Delete);
                if outcome.marked > 0 && deleting && !options.no_finalize {
                    if let Err(e) = session.finalize(&folder) {
                        tracing::warn!("Could not expunge {}: {}", name, e);
                    }
                }
            }
        }

        if let Err(e) = session.close(folder) {
            tracing::warn!("Could not close {}: {}", name, e);
        }

        result.add_folder(outcome);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::{FolderHandle, MarkOutcome};

    struct MockFolder {
        name: String,
        messages: Vec<(u32, Vec<u8>)>,
    }

    /// In-memory mailbox store standing in for an IMAP server.
    struct MockSession {
        folders: Vec<MockFolder>,
        children: Vec<(String, Vec<String>)>,
        next_token: u64,
        open_token: Option<u64>,
        opened_read_only: Vec<(String, bool)>,
        marked: Vec<(String, u32, MarkAction)>,
        copied: Vec<(String, u32, String)>,
        finalized: Vec<String>,
        fail_mark_for: Vec<u32>,
        fail_copy: bool,
    }

    impl MockSession {
        fn new(folders: Vec<(&str, Vec<(u32, Vec<u8>)>)>) -> Self {
            Self {
                folders: folders
                    .into_iter()
                    .map(|(name, messages)| MockFolder {
                        name: name.to_string(),
                        messages,
                    })
                    .collect(),
                children: Vec::new(),
                next_token: 0,
                open_token: None,
                opened_read_only: Vec::new(),
                marked: Vec::new(),
                copied: Vec::new(),
                finalized: Vec::new(),
                fail_mark_for: Vec::new(),
                fail_copy: false,
            }
        }

        fn with_children(mut self, root: &str, children: &[&str]) -> Self {
            self.children.push((
                root.to_string(),
                children.iter().map(|c| c.to_string()).collect(),
            ));
            self
        }

        fn check(&self, folder: &FolderHandle) -> crate::error::Result<()> {
            if self.open_token == Some(folder.token()) {
                Ok(())
            } else {
                Err(Error::StaleFolderHandle(folder.name().to_string()))
            }
        }

        /// Physically remove messages that were marked deleted, as a server
        /// would on expunge.
        fn purge_marked(&mut self) {
            let marked: Vec<(String, u32)> = self
                .marked
                .iter()
                .filter(|(_, _, action)| matches!(action, MarkAction::Delete))
                .map(|(folder, uid, _)| (folder.clone(), *uid))
                .collect();
            for folder in &mut self.folders {
                let name = folder.name.clone();
                folder
                    .messages
                    .retain(|(uid, _)| !marked.contains(&(name.clone(), *uid)));
            }
        }
    }

    impl MailboxSession for MockSession {
        fn list_folders(&mut self, root: Option<&str>) -> crate::error::Result<Vec<String>> {
            match root {
                Some(root) => Ok(self
                    .children
                    .iter()
                    .find(|(name, _)| name == root)
                    .map(|(_, children)| children.clone())
                    .unwrap_or_default()),
                None => Ok(self.folders.iter().map(|f| f.name.clone()).collect()),
            }
        }

        fn open(&mut self, folder: &str, read_only: bool) -> crate::error::Result<FolderHandle> {
            if !self.folders.iter().any(|f| f.name == folder) {
                return Err(Error::FolderUnavailable {
                    folder: folder.to_string(),
                    reason: "no such mailbox".to_string(),
                });
            }
            self.next_token += 1;
            self.open_token = Some(self.next_token);
            self.opened_read_only.push((folder.to_string(), read_only));
            Ok(FolderHandle::new(folder, self.next_token, read_only))
        }

        fn fetch_headers(
            &mut self,
            folder: &FolderHandle,
        ) -> crate::error::Result<Vec<(MessageHandle, Vec<u8>)>> {
            self.check(folder)?;
            Ok(self
                .folders
                .iter()
                .find(|f| f.name == folder.name())
                .map(|f| {
                    f.messages
                        .iter()
                        .map(|(uid, raw)| (MessageHandle(*uid), raw.clone()))
                        .collect()
                })
                .unwrap_or_default())
        }

        fn copy(
            &mut self,
            folder: &FolderHandle,
            messages: &[MessageHandle],
            destination: &str,
        ) -> crate::error::Result<()> {
            self.check(folder)?;
            if self.fail_copy {
                return Err(Error::Session("copy refused".to_string()));
            }
            for handle in messages {
                self.copied
                    .push((folder.name().to_string(), handle.0, destination.to_string()));
            }
            Ok(())
        }

        fn mark(
            &mut self,
            folder: &FolderHandle,
            messages: &[MessageHandle],
            action: &MarkAction,
        ) -> crate::error::Result<MarkOutcome> {
            self.check(folder)?;
            let mut outcome = MarkOutcome::default();
            for handle in messages {
                if self.fail_mark_for.contains(&handle.0) {
                    outcome.failed.push(*handle);
                } else {
                    self.marked
                        .push((folder.name().to_string(), handle.0, action.clone()));
                    outcome.marked += 1;
                }
            }
            Ok(outcome)
        }

        fn finalize(&mut self, folder: &FolderHandle) -> crate::error::Result<()> {
            self.check(folder)?;
            self.finalized.push(folder.name().to_string());
            Ok(())
        }

        fn close(&mut self, folder: FolderHandle) -> crate::error::Result<()> {
            self.check(&folder)?;
            self.open_token = None;
            Ok(())
        }
    }

    fn msg(id: &str) -> Vec<u8> {
        format!(
            "Message-ID: {}\r\nFrom: alice@example.com\r\nTo: bob@example.com\r\n\
             Subject: hello\r\nDate: Mon, 1 Jan 2024 10:00:00 +0000\r\n\r\n",
            id
        )
        .into_bytes()
    }

    fn msg_without_id(subject: &str) -> Vec<u8> {
        format!(
            "From: alice@example.com\r\nTo: bob@example.com\r\n\
             Subject: {}\r\nDate: Mon, 1 Jan 2024 10:00:00 +0000\r\n\r\n",
            subject
        )
        .into_bytes()
    }

    fn marked_uids(session: &MockSession, folder: &str) -> Vec<u32> {
        session
            .marked
            .iter()
            .filter(|(name, _, _)| name == folder)
            .map(|(_, uid, _)| *uid)
            .collect()
    }

    #[test]
    fn test_first_seen_wins_within_folder() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![(1, msg("<x@y>")), (2, msg("<x@y>")), (3, msg("<z@w>"))],
        )]);

        let result = run(&mut session, &["INBOX".to_string()], &RunOptions::default()).unwrap();

        assert_eq!(result.total_scanned(), 3);
        assert_eq!(result.total_duplicates(), 1);
        assert_eq!(result.total_marked(), 1);
        assert_eq!(marked_uids(&session, "INBOX"), vec![2]);
        assert_eq!(session.finalized, vec!["INBOX"]);
    }

    #[test]
    fn test_dry_run_decides_without_mutating() {
        let data = || {
            vec![(
                "INBOX",
                vec![(1, msg("<x@y>")), (2, msg("<x@y>")), (3, msg("<z@w>"))],
            )]
        };

        let mut live = MockSession::new(data());
        let live_result = run(&mut live, &["INBOX".to_string()], &RunOptions::default()).unwrap();

        let mut dry = MockSession::new(data());
        let dry_result = run(
            &mut dry,
            &["INBOX".to_string()],
            &RunOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(dry_result.total_duplicates(), live_result.total_duplicates());
        assert_eq!(dry_result.total_scanned(), live_result.total_scanned());
        assert_eq!(dry_result.total_marked(), 0);
        assert!(dry.marked.is_empty());
        assert!(dry.finalized.is_empty());
        assert_eq!(dry.opened_read_only, vec![("INBOX".to_string(), true)]);
    }

    #[test]
    fn test_folder_order_determines_survivor() {
        let data = || {
            vec![
                ("A", vec![(1, msg("<x@y>"))]),
                ("B", vec![(7, msg("<x@y>"))]),
            ]
        };
        let folders = vec!["A".to_string(), "B".to_string()];

        let mut forward = MockSession::new(data());
        run(&mut forward, &folders, &RunOptions::default()).unwrap();
        assert!(marked_uids(&forward, "A").is_empty());
        assert_eq!(marked_uids(&forward, "B"), vec![7]);

        let mut reversed = MockSession::new(data());
        run(
            &mut reversed,
            &folders,
            &RunOptions {
                reverse: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(marked_uids(&reversed, "A"), vec![1]);
        assert!(marked_uids(&reversed, "B").is_empty());
    }

    #[test]
    fn test_recursive_expansion_preserves_server_order() {
        let mut session = MockSession::new(vec![
            ("INBOX", vec![]),
            ("INBOX.A", vec![]),
            ("INBOX.B", vec![]),
        ])
        .with_children("INBOX", &["INBOX.A", "INBOX.B"]);

        let result = run(
            &mut session,
            &["INBOX".to_string()],
            &RunOptions {
                recursive: true,
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();

        let order: Vec<&str> = result.folders.iter().map(|f| f.folder.as_str()).collect();
        assert_eq!(order, vec!["INBOX", "INBOX.A", "INBOX.B"]);
    }

    #[test]
    fn test_open_failure_is_fatal_but_keeps_earlier_marks() {
        let mut session = MockSession::new(vec![
            ("A", vec![(1, msg("<x@y>")), (2, msg("<x@y>"))]),
            ("C", vec![(5, msg("<x@y>"))]),
        ]);
        let folders = vec!["A".to_string(), "Missing".to_string(), "C".to_string()];

        let err = run(&mut session, &folders, &RunOptions::default()).unwrap_err();

        assert!(matches!(err, Error::FolderUnavailable { folder, .. } if folder == "Missing"));
        assert_eq!(marked_uids(&session, "A"), vec![2]);
        assert!(marked_uids(&session, "C").is_empty());
    }

    #[test]
    fn test_unparseable_message_is_skipped() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![
                (1, msg("<x@y>")),
                (2, b"this line has no colon\r\n\r\n".to_vec()),
                (3, msg("<x@y>")),
            ],
        )]);

        let result = run(&mut session, &["INBOX".to_string()], &RunOptions::default()).unwrap();

        let outcome = &result.folders[0];
        assert_eq!(outcome.scanned, 3);
        assert_eq!(outcome.parse_failures, 1);
        assert_eq!(outcome.duplicate_count(), 1);
        assert_eq!(marked_uids(&session, "INBOX"), vec![3]);
    }

    #[test]
    fn test_second_run_after_purge_finds_nothing() {
        let mut session = MockSession::new(vec![
            ("A", vec![(1, msg("<x@y>")), (2, msg("<x@y>"))]),
            ("B", vec![(3, msg("<x@y>")), (4, msg("<q@r>"))]),
        ]);
        let folders = vec!["A".to_string(), "B".to_string()];

        let first = run(&mut session, &folders, &RunOptions::default()).unwrap();
        assert_eq!(first.total_duplicates(), 2);

        session.purge_marked();
        session.marked.clear();

        let second = run(&mut session, &folders, &RunOptions::default()).unwrap();
        assert_eq!(second.total_duplicates(), 0);
        assert!(session.marked.is_empty());
    }

    #[test]
    fn test_missing_message_id_falls_back_to_checksum() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![
                (1, msg_without_id("same")),
                (2, msg_without_id("same")),
                (3, msg_without_id("different")),
            ],
        )]);

        let result = run(&mut session, &["INBOX".to_string()], &RunOptions::default()).unwrap();

        assert_eq!(result.total_duplicates(), 1);
        assert_eq!(marked_uids(&session, "INBOX"), vec![2]);
    }

    #[test]
    fn test_no_finalize_leaves_marks_unpurged() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![(1, msg("<x@y>")), (2, msg("<x@y>"))],
        )]);

        run(
            &mut session,
            &["INBOX".to_string()],
            &RunOptions {
                no_finalize: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(marked_uids(&session, "INBOX"), vec![2]);
        assert!(session.finalized.is_empty());
    }

    #[test]
    fn test_tagging_skips_expunge() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![(1, msg("<x@y>")), (2, msg("<x@y>"))],
        )]);

        run(
            &mut session,
            &["INBOX".to_string()],
            &RunOptions {
                action: MarkAction::Tag("Duplicate".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(session
            .marked
            .iter()
            .all(|(_, _, action)| *action == MarkAction::Tag("Duplicate".to_string())));
        assert!(session.finalized.is_empty());
    }

    #[test]
    fn test_mark_failure_is_counted_and_run_continues() {
        let mut session = MockSession::new(vec![
            ("A", vec![(1, msg("<x@y>")), (2, msg("<x@y>")), (3, msg("<x@y>"))]),
            ("B", vec![(9, msg("<x@y>"))]),
        ]);
        session.fail_mark_for = vec![2];

        let result = run(
            &mut session,
            &["A".to_string(), "B".to_string()],
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(result.folders[0].marked, 1);
        assert_eq!(result.folders[0].mark_failures, 1);
        assert_eq!(marked_uids(&session, "B"), vec![9]);
        assert_eq!(result.total_mark_failures(), 1);
    }

    #[test]
    fn test_copy_failure_skips_marking_for_the_folder() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![(1, msg("<x@y>")), (2, msg("<x@y>"))],
        )]);
        session.fail_copy = true;

        let result = run(
            &mut session,
            &["INBOX".to_string()],
            &RunOptions {
                copy_to: Some("Duplicates".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(result.folders[0].marked, 0);
        assert_eq!(result.folders[0].mark_failures, 1);
        assert!(session.marked.is_empty());
        assert!(session.finalized.is_empty());
    }

    #[test]
    fn test_copy_precedes_marking() {
        let mut session = MockSession::new(vec![(
            "INBOX",
            vec![(1, msg("<x@y>")), (2, msg("<x@y>"))],
        )]);

        run(
            &mut session,
            &["INBOX".to_string()],
            &RunOptions {
                copy_to: Some("Duplicates".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            session.copied,
            vec![("INBOX".to_string(), 2, "Duplicates".to_string())]
        );
        assert_eq!(marked_uids(&session, "INBOX"), vec![2]);
    }
}
