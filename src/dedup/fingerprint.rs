//! Message fingerprinting.

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::config::FingerprintMode;
use crate::message::MessageHeaders;

/// Opaque digest used to decide message equivalence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the fingerprint of a message under the given mode.
///
/// Deterministic: two messages with identical normalized headers under the
/// same mode always produce equal fingerprints. Under
/// [`FingerprintMode::MessageId`], a message without a Message-ID is
/// fingerprinted exactly as it would be under [`FingerprintMode::Checksum`].
pub fn fingerprint(headers: &MessageHeaders, mode: FingerprintMode) -> Fingerprint {
    match mode {
        FingerprintMode::MessageId => match &headers.message_id {
            Some(id) => Fingerprint(id.clone()),
            None => checksum(headers, false),
        },
        FingerprintMode::Checksum => checksum(headers, false),
        FingerprintMode::ChecksumWithId => checksum(headers, true),
    }
}

/// Digest the labeled concatenation of the content-describing headers.
///
/// Absent headers contribute an empty value, so the input layout is stable
/// regardless of which headers a message carries.
fn checksum(headers: &MessageHeaders, include_id: bool) -> Fingerprint {
    let fields = [
        ("From", headers.from.as_deref()),
        ("To", headers.to.as_deref()),
        ("Subject", headers.subject.as_deref()),
        ("Date", headers.date.as_deref()),
        ("Cc", headers.cc.as_deref()),
        ("Bcc", headers.bcc.as_deref()),
    ];

    let mut input = Vec::new();
    for (label, value) in fields {
        input.extend_from_slice(label.as_bytes());
        input.push(b':');
        input.extend_from_slice(value.unwrap_or("").as_bytes());
    }
    if include_id {
        input.extend_from_slice(b"Message-ID:");
        input.extend_from_slice(headers.message_id.as_deref().unwrap_or("").as_bytes());
    }

    let md5 = Md5::digest(&input);
    let sha = Sha256::digest(&input);

    Fingerprint(format!("{:x}|{:x}", md5, sha))
}
