//! Parsing and normalization of message header blocks.

use mailparse::{parse_headers, MailHeaderMap};

use crate::error::Result;

/// The header fields relevant to fingerprinting, decoded and normalized.
///
/// Each value is decoded from its transport encoding, trimmed, and has
/// internal folding whitespace collapsed to a single space. Case is
/// preserved; comparison is exact-string after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeaders {
    pub message_id: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
}

/// Display-oriented subset of a message's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSummary {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub date: Option<String>,
}

impl MessageHeaders {
    /// Parse a raw RFC 5322 header block.
    ///
    /// Uses the first instance of a header when more than one is present.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (headers, _) = parse_headers(raw)?;

        Ok(Self {
            message_id: normalize(headers.get_first_value("Message-ID")),
            to: normalize(headers.get_first_value("To")),
            from: normalize(headers.get_first_value("From")),
            subject: normalize(headers.get_first_value("Subject")),
            date: normalize(headers.get_first_value("Date")),
            cc: normalize(headers.get_first_value("Cc")),
            bcc: normalize(headers.get_first_value("Bcc")),
        })
    }

    /// Display-oriented subset for reporting duplicates.
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            subject: self.subject.clone(),
            from: self.from.clone(),
            date: self.date.clone(),
        }
    }
}

/// Collapse runs of whitespace (including folding line breaks) to a single
/// space and trim the ends. Empty values become `None`.
fn normalize(value: Option<String>) -> Option<String> {
    let value = value?;
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
