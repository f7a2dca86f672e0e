//! Configuration validation logic.

use chrono::NaiveDate;
use regex::Regex;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration before a run.
///
/// `list_only` relaxes the folder requirements, since listing needs nothing
/// beyond a connection.
pub fn validate_config(config: &Config, list_only: bool) -> Result<()> {
    if config.server.host.as_deref().unwrap_or("").is_empty() {
        return Err(Error::MissingConfig("server.host".to_string()));
    }

    if config.auth.user.as_deref().unwrap_or("").is_empty() {
        return Err(Error::MissingConfig("auth.user".to_string()));
    }

    if !list_only {
        validate_folders(&config.options.folders, config.options.recursive)?;
    }

    if let Some(tag) = &config.options.tag {
        validate_tag(tag)?;
    }

    if let Some(date) = &config.options.sent_before {
        parse_sent_before(date)?;
    }

    if config.options.fetch_batch == 0 {
        return Err(Error::ConfigValidation {
            field: "fetch_batch".to_string(),
            message: "Batch size must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Validate the folder list.
pub fn validate_folders(folders: &[String], recursive: bool) -> Result<()> {
    if folders.is_empty() {
        return Err(Error::MissingConfig(
            "folders (at least one mailbox required)".to_string(),
        ));
    }

    if recursive && folders.len() > 1 {
        return Err(Error::ConfigValidation {
            field: "folders".to_string(),
            message: format!(
                "Recursive mode expands a single root folder (got {})",
                folders.len()
            ),
        });
    }

    for folder in folders {
        if folder.trim().is_empty() {
            return Err(Error::ConfigValidation {
                field: "folders".to_string(),
                message: "Folder names must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate a keyword used to tag duplicates.
///
/// IMAP keywords are atoms; restrict to the character set servers accept
/// without quoting.
pub fn validate_tag(tag: &str) -> Result<()> {
    let keyword_pattern = Regex::new(r"^[A-Za-z0-9$_.-]+$").unwrap();

    if !keyword_pattern.is_match(tag) {
        return Err(Error::ConfigValidation {
            field: "tag".to_string(),
            message: format!(
                "Keyword '{}' contains invalid characters. Only alphanumeric, $, _, . and - allowed.",
                tag
            ),
        });
    }

    Ok(())
}

/// Parse a sent-before date given as d-Mon-Y (e.g. 1-Feb-2020) into the
/// canonical form used in search queries.
pub fn parse_sent_before(input: &str) -> Result<String> {
    let input = input.trim();

    let date = NaiveDate::parse_from_str(input, "%d-%b-%Y").map_err(|e| {
        Error::ConfigValidation {
            field: "sent_before".to_string(),
            message: format!("Invalid date '{}' (expected d-Mon-Y, e.g. 1-Feb-2020): {}", input, e),
        }
    })?;

    Ok(date.format("%d-%b-%Y").to_string())
}
