//! Error types for the imap-dedup application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Credential errors
    #[error("Could not resolve a password: {0}")]
    Credentials(String),

    #[error("Login failed: {0}")]
    Authentication(String),

    // Run errors
    #[error("Folder '{folder}' unavailable: {reason}")]
    FolderUnavailable { folder: String, reason: String },

    #[error("Folder handle for '{0}' is no longer valid")]
    StaleFolderHandle(String),

    #[error("Session error: {0}")]
    Session(String),

    // Message errors
    #[error("Header parse failure: {0}")]
    HeaderParse(#[from] mailparse::MailParseError),

    // Transport errors
    #[error("IMAP error: {0}")]
    Imap(#[from] imap::error::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    // Credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes reported to the shell.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 1;
    pub const CONNECT_ERROR: i32 = 2;
    pub const RUN_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 4;
}
