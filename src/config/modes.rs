//! Fingerprinting mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a message's fingerprint is derived from its headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FingerprintMode {
    /// Use the normalized Message-ID header (default). A message without a
    /// Message-ID is fingerprinted as if under `Checksum`, for that message
    /// only.
    #[default]
    MessageId,
    /// Digest over the From, To, Subject, Date, Cc and Bcc headers.
    Checksum,
    /// Like `Checksum`, but the Message-ID (if any) is included in the
    /// digest.
    ChecksumWithId,
}

impl fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintMode::MessageId => write!(f, "message-id"),
            FingerprintMode::Checksum => write!(f, "checksum"),
            FingerprintMode::ChecksumWithId => write!(f, "checksum-with-id"),
        }
    }
}

impl FromStr for FingerprintMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "message-id" => Ok(FingerprintMode::MessageId),
            "checksum" => Ok(FingerprintMode::Checksum),
            "checksum-with-id" => Ok(FingerprintMode::ChecksumWithId),
            _ => Err(format!("Unknown fingerprint mode: {}", s)),
        }
    }
}
