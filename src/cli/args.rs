//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, FingerprintMode};

/// IMAP duplicate remover CLI.
#[derive(Parser, Debug)]
#[command(
    name = "imap-dedup",
    version,
    about = "Mark duplicate messages in IMAP mailboxes for deletion",
    long_about = "Looks for duplicate messages in a set of IMAP mailboxes and marks all but\n\
                  the first occurrence for removal. Comparison is normally based on the\n\
                  Message-ID header; checksum modes compare a digest of several headers\n\
                  instead."
)]
pub struct Args {
    /// IMAP server host name.
    #[arg(short, long, env = "IMAP_DEDUP_SERVER")]
    pub server: Option<String>,

    /// IMAP server port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Connect in cleartext and upgrade with STARTTLS (default is implicit TLS).
    #[arg(short = 'X', long)]
    pub starttls: bool,

    /// IMAP user name.
    #[arg(short, long, env = "IMAP_DEDUP_USER")]
    pub user: Option<String>,

    /// IMAP admin user for SASL PLAIN proxy authentication.
    #[arg(short = 'a', long)]
    pub authuser: Option<String>,

    /// IMAP password. Resolved via keyring, environment or prompt when absent.
    #[arg(short = 'w', long, env = "IMAP_DEDUP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Keyring service to get the password from. No value means the server
    /// host name.
    #[arg(
        short = 'K',
        long,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "SERVICE"
    )]
    pub keyring: Option<String>,

    /// Fingerprinting mode.
    #[arg(short, long, value_enum)]
    pub mode: Option<FingerprintModeArg>,

    /// Only process messages sent before the given date (d-Mon-Y, e.g.
    /// 1-Feb-2020).
    #[arg(short = 'b', long, value_name = "DATE")]
    pub sent_before: Option<String>,

    /// Don't actually do anything, just report what would be done.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show the headers of duplicated messages.
    #[arg(short = 'S', long)]
    pub show: bool,

    /// Process the named mailbox and all mailboxes below it.
    #[arg(short, long)]
    pub recursive: bool,

    /// Walk through the folders in reverse order.
    #[arg(short = 'R', long)]
    pub reverse: bool,

    /// Tag duplicates with the given keyword instead of marking them deleted.
    #[arg(short = 't', long, value_name = "KEYWORD")]
    pub tag: Option<String>,

    /// Copy duplicates to the given mailbox before marking them.
    #[arg(short = 'y', long, value_name = "MAILBOX")]
    pub copy_to: Option<String>,

    /// Leave duplicates marked but not expunged when the run completes.
    #[arg(long)]
    pub no_finalize: bool,

    /// Just list the available mailboxes.
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Mailboxes to process, in order.
    #[arg(value_name = "MAILBOX")]
    pub mailboxes: Vec<String>,
}

/// CLI fingerprint mode argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FingerprintModeArg {
    /// Compare normalized Message-ID headers.
    MessageId,
    /// Compare a digest of several mail headers.
    Checksum,
    /// Include the Message-ID (if any) in the checksum.
    ChecksumWithId,
}

impl From<FingerprintModeArg> for FingerprintMode {
    fn from(arg: FingerprintModeArg) -> Self {
        match arg {
            FingerprintModeArg::MessageId => FingerprintMode::MessageId,
            FingerprintModeArg::Checksum => FingerprintMode::Checksum,
            FingerprintModeArg::ChecksumWithId => FingerprintMode::ChecksumWithId,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server.host = Some(server.clone());
        }

        if let Some(port) = self.port {
            config.server.port = Some(port);
        }

        if self.starttls {
            config.server.starttls = true;
        }

        if let Some(user) = &self.user {
            config.auth.user = Some(user.clone());
        }

        if let Some(authuser) = &self.authuser {
            config.auth.authuser = Some(authuser.clone());
        }

        if let Some(password) = &self.password {
            config.auth.password = Some(password.clone());
        }

        if let Some(keyring) = &self.keyring {
            config.auth.keyring = Some(keyring.clone());
        }

        if let Some(mode) = self.mode {
            config.options.mode = mode.into();
        }

        if let Some(date) = &self.sent_before {
            config.options.sent_before = Some(date.clone());
        }

        if let Some(tag) = &self.tag {
            config.options.tag = Some(tag.clone());
        }

        if let Some(copy_to) = &self.copy_to {
            config.options.copy_to = Some(copy_to.clone());
        }

        // Boolean flags (only override if set to non-default)
        if self.dry_run {
            config.options.dry_run = true;
        }

        if self.show {
            config.options.show_duplicates = true;
        }

        if self.recursive {
            config.options.recursive = true;
        }

        if self.reverse {
            config.options.reverse = true;
        }

        if self.no_finalize {
            config.options.no_finalize = true;
        }

        if !self.mailboxes.is_empty() {
            config.options.folders = self.mailboxes.clone();
        }
    }
}
