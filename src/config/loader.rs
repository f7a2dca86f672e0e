//! Configuration structures and loading logic.

use crate::config::modes::FingerprintMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// IMAP server connection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IMAP server host name.
    pub host: Option<String>,

    /// IMAP server port. Defaults to 993 (implicit TLS) or 143 (STARTTLS).
    pub port: Option<u16>,

    /// Connect in cleartext and upgrade with STARTTLS instead of using
    /// implicit TLS.
    #[serde(default)]
    pub starttls: bool,
}

/// Account credentials configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// IMAP login name (the mailbox owner).
    pub user: Option<String>,

    /// Administrator account for SASL PLAIN proxy authentication. When set,
    /// the password belongs to this account and `user` names the mailbox
    /// being administered.
    pub authuser: Option<String>,

    /// IMAP password. Resolved through the keyring, environment or an
    /// interactive prompt when absent.
    pub password: Option<String>,

    /// Keyring service name to look the password up under. An empty string
    /// means "use the server host name".
    pub keyring: Option<String>,
}

/// Run options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Fingerprinting mode (message-id, checksum, checksum-with-id).
    #[serde(default)]
    pub mode: FingerprintMode,

    /// Folders to process, in order.
    #[serde(default)]
    pub folders: Vec<String>,

    /// Expand the (single) named folder into itself plus all descendants.
    #[serde(default)]
    pub recursive: bool,

    /// Walk the expanded folder list in reverse order.
    #[serde(default)]
    pub reverse: bool,

    /// Decide and report only; never mutate server state.
    #[serde(default)]
    pub dry_run: bool,

    /// Print header details of every duplicate found.
    #[serde(default)]
    pub show_duplicates: bool,

    /// Leave duplicates marked but not expunged at the end of the run.
    #[serde(default)]
    pub no_finalize: bool,

    /// Tag duplicates with this keyword instead of marking them deleted.
    #[serde(default)]
    pub tag: Option<String>,

    /// Copy duplicates to this folder before marking them.
    #[serde(default)]
    pub copy_to: Option<String>,

    /// Only consider messages sent before this date (d-Mon-Y, e.g.
    /// 1-Feb-2020).
    #[serde(default)]
    pub sent_before: Option<String>,

    /// Number of messages fetched per header batch.
    #[serde(default = "default_fetch_batch")]
    pub fetch_batch: usize,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            mode: FingerprintMode::default(),
            folders: Vec::new(),
            recursive: false,
            reverse: false,
            dry_run: false,
            show_duplicates: false,
            no_finalize: false,
            tag: None,
            copy_to: None,
            sent_before: None,
            fetch_batch: default_fetch_batch(),
        }
    }
}

fn default_fetch_batch() -> usize {
    100
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
host = "imap.example.com"

[auth]
user = "alice"

[options]
mode = "checksum"
folders = ["INBOX", "Archive"]
dry_run = true
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host.as_deref(), Some("imap.example.com"));
        assert_eq!(config.auth.user.as_deref(), Some("alice"));
        assert_eq!(config.options.mode, FingerprintMode::Checksum);
        assert_eq!(config.options.folders, vec!["INBOX", "Archive"]);
        assert!(config.options.dry_run);
        assert_eq!(config.options.fetch_batch, 100);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
