//! IMAP implementation of the mailbox session.

use std::collections::HashMap;
use std::net::TcpStream;

use imap::types::NameAttribute;
use native_tls::{TlsConnector, TlsStream};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::session::{
    Credentials, FolderHandle, MailboxSession, MarkAction, MarkOutcome, MessageHandle,
};

/// Default port for implicit TLS connections.
const IMAPS_PORT: u16 = 993;

/// Default port for STARTTLS connections.
const IMAP_PORT: u16 = 143;

type TlsSession = imap::Session<TlsStream<TcpStream>>;

/// A live IMAP connection.
///
/// One folder is selected at a time; folder handles carry a generation token
/// so that handles from a previously selected folder are rejected instead of
/// silently addressing the wrong messages.
pub struct ImapSession {
    session: TlsSession,
    generation: u64,
    open: Option<OpenFolder>,
    sent_before: Option<String>,
    fetch_batch: usize,
}

struct OpenFolder {
    token: u64,
}

/// SASL PLAIN with separate authorization and authentication identities,
/// for administering another user's mailbox.
struct ProxyAuth<'a> {
    authzid: &'a str,
    authcid: &'a str,
    password: &'a str,
}

impl imap::Authenticator for ProxyAuth<'_> {
    type Response = String;

    fn process(&self, _challenge: &[u8]) -> Self::Response {
        format!("{}\x00{}\x00{}", self.authzid, self.authcid, self.password)
    }
}

impl ImapSession {
    /// Connect to the configured server and authenticate.
    pub fn connect(
        server: &ServerConfig,
        credentials: &Credentials,
        sent_before: Option<String>,
        fetch_batch: usize,
    ) -> Result<Self> {
        let host = server
            .host
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("server.host".to_string()))?;
        let tls = TlsConnector::builder().build()?;

        let client = if server.starttls {
            let port = server.port.unwrap_or(IMAP_PORT);
            tracing::info!("Connecting to {}:{} (STARTTLS)", host, port);
            imap::connect_starttls((host, port), host, &tls)?
        } else {
            let port = server.port.unwrap_or(IMAPS_PORT);
            tracing::info!("Connecting to {}:{} (TLS)", host, port);
            imap::connect((host, port), host, &tls)?
        };

        let session = match &credentials.authuser {
            Some(authuser) => {
                tracing::debug!("Authenticating as {} on behalf of {}", authuser, credentials.user);
                let auth = ProxyAuth {
                    authzid: &credentials.user,
                    authcid: authuser,
                    password: &credentials.password,
                };
                client
                    .authenticate("PLAIN", &auth)
                    .map_err(|(e, _)| Error::Authentication(e.to_string()))?
            }
            None => client
                .login(&credentials.user, &credentials.password)
                .map_err(|(e, _)| Error::Authentication(e.to_string()))?,
        };

        Ok(Self {
            session,
            generation: 0,
            open: None,
            sent_before,
            fetch_batch,
        })
    }

    fn check(&self, folder: &FolderHandle) -> Result<()> {
        match &self.open {
            Some(open) if open.token == folder.token() => Ok(()),
            _ => Err(Error::StaleFolderHandle(folder.name().to_string())),
        }
    }

    fn search_query(&self) -> String {
        match &self.sent_before {
            Some(date) => format!("UNDELETED SENTBEFORE {}", date),
            None => "UNDELETED".to_string(),
        }
    }

    fn uid_set(messages: &[MessageHandle]) -> String {
        messages
            .iter()
            .map(|handle| handle.0.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl MailboxSession for ImapSession {
    fn list_folders(&mut self, root: Option<&str>) -> Result<Vec<String>> {
        match root {
            None => {
                let names = self.session.list(None, Some("*"))?;
                Ok(names
                    .iter()
                    .filter(|name| !name.attributes().contains(&NameAttribute::NoSelect))
                    .map(|name| name.name().to_string())
                    .collect())
            }
            Some(root) => {
                // An empty pattern makes the server reveal the hierarchy
                // delimiter for the root.
                let probe = self.session.list(Some(root), Some(""))?;
                let delimiter = probe
                    .iter()
                    .next()
                    .and_then(|name| name.delimiter())
                    .map(str::to_string);

                match delimiter {
                    None => Ok(Vec::new()),
                    Some(delimiter) => {
                        let pattern = format!("{}*", delimiter);
                        let names = self.session.list(Some(root), Some(&pattern))?;
                        Ok(names
                            .iter()
                            .filter(|name| !name.attributes().contains(&NameAttribute::NoSelect))
                            .map(|name| name.name().to_string())
                            .collect())
                    }
                }
            }
        }
    }

    fn open(&mut self, folder: &str, read_only: bool) -> Result<FolderHandle> {
        let result = if read_only {
            self.session.examine(folder)
        } else {
            self.session.select(folder)
        };

        let mailbox = result.map_err(|e| Error::FolderUnavailable {
            folder: folder.to_string(),
            reason: e.to_string(),
        })?;

        self.generation += 1;
        self.open = Some(OpenFolder {
            token: self.generation,
        });

        tracing::info!("There are {} message(s) in {}", mailbox.exists, folder);
        Ok(FolderHandle::new(folder, self.generation, read_only))
    }

    fn fetch_headers(&mut self, folder: &FolderHandle) -> Result<Vec<(MessageHandle, Vec<u8>)>> {
        self.check(folder)?;

        let query = self.search_query();
        let mut uids: Vec<u32> = self.session.uid_search(&query)?.into_iter().collect();
        uids.sort_unstable();
        tracing::debug!(
            "{} message(s) match '{}' in {}",
            uids.len(),
            query,
            folder.name()
        );

        let mut out = Vec::with_capacity(uids.len());
        for chunk in uids.chunks(self.fetch_batch) {
            let set = chunk
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let fetches = self.session.uid_fetch(&set, "(UID RFC822.HEADER)")?;

            let mut by_uid: HashMap<u32, Vec<u8>> = fetches
                .iter()
                .filter_map(|fetch| Some((fetch.uid?, fetch.header()?.to_vec())))
                .collect();

            // Report in the requested order; servers may answer out of order.
            for uid in chunk {
                match by_uid.remove(uid) {
                    Some(raw) => out.push((MessageHandle(*uid), raw)),
                    None => tracing::warn!(
                        "No header returned for message {} in {}",
                        uid,
                        folder.name()
                    ),
                }
            }
        }

        Ok(out)
    }

    fn copy(
        &mut self,
        folder: &FolderHandle,
        messages: &[MessageHandle],
        destination: &str,
    ) -> Result<()> {
        self.check(folder)?;
        self.session
            .uid_copy(Self::uid_set(messages), destination)?;
        Ok(())
    }

    fn mark(
        &mut self,
        folder: &FolderHandle,
        messages: &[MessageHandle],
        action: &MarkAction,
    ) -> Result<MarkOutcome> {
        self.check(folder)?;

        let flags = match action {
            MarkAction::Delete => "+FLAGS (\\Deleted)".to_string(),
            MarkAction::Tag(keyword) => format!("+FLAGS ({})", keyword),
        };

        match self.session.uid_store(Self::uid_set(messages), &flags) {
            Ok(_) => Ok(MarkOutcome {
                marked: messages.len() as u64,
                failed: Vec::new(),
            }),
            Err(e) => {
                tracing::warn!("Batched store failed ({}), retrying per message", e);
                let mut outcome = MarkOutcome::default();
                for handle in messages {
                    match self.session.uid_store(handle.0.to_string(), &flags) {
                        Ok(_) => outcome.marked += 1,
                        Err(e) => {
                            tracing::warn!("Store failed for message {}: {}", handle, e);
                            outcome.failed.push(*handle);
                        }
                    }
                }
                Ok(outcome)
            }
        }
    }

    fn finalize(&mut self, folder: &FolderHandle) -> Result<()> {
        self.check(folder)?;
        tracing::info!("Expunging deleted messages in {}...", folder.name());
        self.session.expunge()?;
        Ok(())
    }

    fn close(&mut self, folder: FolderHandle) -> Result<()> {
        self.check(&folder)?;
        self.open = None;
        // The protocol CLOSE command purges marked messages as a side
        // effect; deselection happens implicitly at the next open, keeping
        // marks recoverable until an explicit finalize.
        Ok(())
    }
}

impl Drop for ImapSession {
    fn drop(&mut self) {
        let _ = self.session.logout();
    }
}
